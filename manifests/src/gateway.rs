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

use k8s_openapi::api::apps::v1::Deployment;
use k8s_openapi::api::core::v1::Service;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    configure_deployment_for_mode, configure_service_for_mode,
    configure_service_monitor_for_mode, monitoring::ServiceMonitor, GatewayContext, Result,
};

/// The gateway objects whose content depends on the tenancy mode.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayObjects {
    pub deployment: Deployment,
    pub service: Service,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_monitor: Option<ServiceMonitor>,
}

/// Configures all gateway objects for the stack's tenancy mode.
///
/// Either every object is configured and the new set is returned, or the first error is
/// returned and the caller's objects stay as they were. Only commit the result to the cluster
/// on success.
pub fn configure_gateway_objects(
    objects: &GatewayObjects,
    ctx: &GatewayContext,
) -> Result<GatewayObjects> {
    let deployment = configure_deployment_for_mode(objects.deployment.clone(), ctx)?;

    let mut service = objects.service.clone();
    if let Some(spec) = service.spec.take() {
        service.spec = Some(configure_service_for_mode(spec, ctx)?);
    }

    let service_monitor = objects
        .service_monitor
        .clone()
        .map(|sm| configure_service_monitor_for_mode(sm, ctx))
        .transpose()?;

    info!(
        stack = %ctx.stack_name,
        namespace = %ctx.stack_namespace,
        mode = ?ctx.mode,
        "configured gateway objects"
    );
    Ok(GatewayObjects {
        deployment,
        service,
        service_monitor,
    })
}
