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

use k8s_openapi::api::core::v1::{ServicePort, ServiceSpec};

use crate::{
    consts::{OPA_INTERNAL_PORT, OPA_INTERNAL_PORT_NAME},
    rules::{always, apply_rules, Rule},
    utils::upsert,
    GatewayContext, Result, TenancyMode,
};

const SERVICE_RULES: &[Rule<ServiceSpec>] = &[Rule {
    name: "opa-internal-port",
    modes: &[TenancyMode::OpenshiftLogging],
    gate: always,
    apply: expose_opa_internal_port,
}];

// Exposes the authorization sidecar's metrics and health port on the gateway Service for
// OpenShift-integrated stacks. Other modes return the spec unchanged.
pub fn configure_service_for_mode(spec: ServiceSpec, ctx: &GatewayContext) -> Result<ServiceSpec> {
    apply_rules(SERVICE_RULES, spec, ctx)
}

fn expose_opa_internal_port(spec: &mut ServiceSpec, _: &GatewayContext) -> Result<()> {
    upsert(
        spec.ports.get_or_insert_with(Vec::new),
        ServicePort {
            name: Some(OPA_INTERNAL_PORT_NAME.to_string()),
            port: OPA_INTERNAL_PORT,
            ..Default::default()
        },
    );
    Ok(())
}
