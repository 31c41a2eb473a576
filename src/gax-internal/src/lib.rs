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

//! Implementation details for Azure Resource Manager clients.
//!
//! This crate provides a [Pipeline][gax::pipeline::Pipeline] implementation
//! based on `reqwest`. Authentication and retry policies are not part of this
//! crate: applications that need them can wrap the pipeline, or provide their
//! own implementation of the trait.

pub mod http;
