/*
Copyright 2024 The Kubernetes Authors.

Licensed under the Apache License, Version 2.0 (the "License");
you may not use this file except in compliance with the License.
You may obtain a copy of the License at

    http://www.apache.org/licenses/LICENSE-2.0

Unless required by applicable law or agreed to in writing, software
distributed under the License is distributed on an "AS IS" BASIS,
WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
See the License for the specific language governing permissions and
limitations under the License.
*/

use thiserror::Error;

pub use credentials::{apply_credentials, apply_credentials_with_rng, persist_credentials};
pub use deployment::configure_deployment_for_mode;
pub use gateway::{configure_gateway_objects, GatewayObjects};
pub use monitoring::{Endpoint, ServiceMonitor, ServiceMonitorSpec, TlsConfig};
pub use options::*;
pub use service::configure_service_for_mode;
pub use service_monitor::configure_service_monitor_for_mode;

pub mod consts;
pub mod naming;

mod credentials;
mod deployment;
mod gateway;
mod monitoring;
mod options;
mod rules;
mod service;
mod service_monitor;
mod traits;
mod utils;

#[derive(Error, Debug)]
pub enum Error {
    #[error("container `{0}` not found in workload")]
    ContainerNotFound(String),
    #[error("invalid tenant configuration: `{0}`")]
    InvalidTenantConfig(String),
    #[error("failed to generate tenant secret: {0}")]
    SecretGenerationError(#[source] rand::Error),
    #[error("no existing endpoint provides a TLS config for `{0}` to inherit")]
    MissingTLSConfig(String),
    #[error("invalid input: `{0}`")]
    InvalidInput(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
