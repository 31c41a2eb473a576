// Copyright 2025 The Azure Resource Manager SDK for Rust Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};

/// The state of a long-running operation.
///
/// Services report the state as a string, either in the `status` field of a
/// status monitor resource, or in the `properties.provisioningState` field of
/// the resource itself. The comparison is case-insensitive. Values outside the
/// documented vocabulary, for example `Creating` or `Updating`, are treated as
/// [InProgress][OperationStatus::InProgress].
///
/// # Example
/// ```
/// # use azure_arm_lro::OperationStatus;
/// assert_eq!(OperationStatus::from("succeeded"), OperationStatus::Succeeded);
/// assert_eq!(OperationStatus::from("Deleting"), OperationStatus::InProgress);
/// assert!(OperationStatus::from("Canceled").is_terminal());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum OperationStatus {
    /// The service accepted the operation but did not start it yet.
    NotStarted,
    /// The operation is running.
    InProgress,
    /// The operation completed successfully.
    Succeeded,
    /// The operation completed with an error.
    Failed,
    /// The operation was canceled before it completed.
    Canceled,
}

impl OperationStatus {
    /// Returns true if the operation will not make further progress.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }

    /// Returns true if the operation completed with [Failed][Self::Failed] or
    /// [Canceled][Self::Canceled].
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed | Self::Canceled)
    }

    /// The canonical name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotStarted => "NotStarted",
            Self::InProgress => "InProgress",
            Self::Succeeded => "Succeeded",
            Self::Failed => "Failed",
            Self::Canceled => "Canceled",
        }
    }
}

impl From<&str> for OperationStatus {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "notstarted" => Self::NotStarted,
            "succeeded" => Self::Succeeded,
            "failed" => Self::Failed,
            "canceled" | "cancelled" => Self::Canceled,
            _ => Self::InProgress,
        }
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
