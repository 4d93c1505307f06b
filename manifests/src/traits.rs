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

use k8s_openapi::api::core::v1::{Container, ContainerPort, ServicePort, Volume, VolumeMount};

use crate::monitoring::Endpoint;

// Items of a manifest list that are identified by a stable key.
pub trait Keyed {
    fn key(&self) -> &str;
}

impl Keyed for Container {
    fn key(&self) -> &str {
        &self.name
    }
}

impl Keyed for Volume {
    fn key(&self) -> &str {
        &self.name
    }
}

// A mount path can only be used once per container, so mounts are keyed by path rather than by
// the volume they reference.
impl Keyed for VolumeMount {
    fn key(&self) -> &str {
        &self.mount_path
    }
}

impl Keyed for ContainerPort {
    fn key(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl Keyed for ServicePort {
    fn key(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

impl Keyed for Endpoint {
    fn key(&self) -> &str {
        self.port.as_deref().unwrap_or_default()
    }
}
