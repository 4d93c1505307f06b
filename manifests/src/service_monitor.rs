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

use crate::{
    consts::{BEARER_TOKEN_FILE, METRICS_PATH, OPA_INTERNAL_PORT_NAME},
    monitoring::{Endpoint, ServiceMonitor},
    rules::{always, apply_rules, Rule},
    utils::upsert,
    Error, GatewayContext, Result, TenancyMode,
};

const SERVICE_MONITOR_RULES: &[Rule<ServiceMonitor>] = &[Rule {
    name: "opa-metrics-endpoint",
    modes: &[TenancyMode::OpenshiftLogging],
    gate: always,
    apply: scrape_opa_metrics,
}];

/// Adds a scrape endpoint for the authorization sidecar's metrics to the gateway
/// ServiceMonitor of an OpenShift-integrated stack.
///
/// With both `httpEncryption` and `serviceMonitorTLSEndpoints` enabled the endpoint is scraped
/// over https with the service account token, reusing the TLS settings of the first other
/// endpoint on the monitor. Fails with [`Error::MissingTLSConfig`] if there is none.
pub fn configure_service_monitor_for_mode(
    service_monitor: ServiceMonitor,
    ctx: &GatewayContext,
) -> Result<ServiceMonitor> {
    apply_rules(SERVICE_MONITOR_RULES, service_monitor, ctx)
}

fn scrape_opa_metrics(service_monitor: &mut ServiceMonitor, ctx: &GatewayContext) -> Result<()> {
    let gates = &ctx.feature_gates;
    let endpoints = &mut service_monitor.spec.endpoints;

    let mut endpoint = Endpoint {
        port: Some(OPA_INTERNAL_PORT_NAME.to_string()),
        path: Some(METRICS_PATH.to_string()),
        scheme: Some("http".to_string()),
        ..Default::default()
    };

    if gates.http_encryption && gates.service_monitor_tls_endpoints {
        let tls_config = endpoints
            .iter()
            .filter(|e| e.port.as_deref() != Some(OPA_INTERNAL_PORT_NAME))
            .find_map(|e| e.tls_config.clone())
            .ok_or_else(|| Error::MissingTLSConfig(OPA_INTERNAL_PORT_NAME.to_string()))?;

        endpoint.scheme = Some("https".to_string());
        endpoint.bearer_token_file = Some(BEARER_TOKEN_FILE.to_string());
        endpoint.tls_config = Some(tls_config);
    }

    upsert(endpoints, endpoint);
    Ok(())
}
