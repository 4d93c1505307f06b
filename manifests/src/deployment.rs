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
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, ContainerPort, HTTPGetAction, PodSpec, Probe,
    SecretVolumeSource, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use tracing::debug;

use crate::{
    consts::*,
    naming,
    rules::{always, any_applies, apply_rules, Rule},
    utils::{find, insert_missing, rewrite_flag, upsert, upsert_flag, with_https},
    Error, FeatureGates, GatewayContext, Result, TenancyMode,
};

const PROBE_SCHEME_HTTP: &str = "HTTP";
const PROBE_SCHEME_HTTPS: &str = "HTTPS";

const OPENSHIFT_LOGGING: &[TenancyMode] = &[TenancyMode::OpenshiftLogging];

// Order matters: the sidecar reuses the TLS mount set up for the gateway container, and the
// upstream CA flag lands ahead of the server TLS flags.
const DEPLOYMENT_RULES: &[Rule<PodSpec>] = &[
    Rule {
        name: "gateway-container",
        modes: OPENSHIFT_LOGGING,
        gate: always,
        apply: require_gateway_container,
    },
    Rule {
        name: "gateway-healthcheck-tls",
        modes: OPENSHIFT_LOGGING,
        gate: http_encryption,
        apply: configure_healthcheck_tls,
    },
    Rule {
        name: "gateway-upstream-tls",
        modes: OPENSHIFT_LOGGING,
        gate: serving_certs_service,
        apply: configure_upstream_tls,
    },
    Rule {
        name: "gateway-server-tls",
        modes: OPENSHIFT_LOGGING,
        gate: http_encryption,
        apply: configure_server_tls,
    },
    Rule {
        name: "opa-sidecar",
        modes: OPENSHIFT_LOGGING,
        gate: always,
        apply: configure_opa_sidecar,
    },
];

/// Rewrites the gateway Deployment for the stack's tenancy mode and feature gates.
///
/// Static and dynamic stacks are returned unchanged. OpenShift-integrated stacks get their
/// gateway container switched to TLS as the feature gates ask for, and an OPA authorization
/// sidecar. Calling this again on its own output yields the same Deployment.
pub fn configure_deployment_for_mode(
    mut deployment: Deployment,
    ctx: &GatewayContext,
) -> Result<Deployment> {
    if !any_applies(DEPLOYMENT_RULES, ctx) {
        return Ok(deployment);
    }

    let spec = deployment.spec.get_or_insert_with(Default::default);
    let pod_spec = spec.template.spec.take().unwrap_or_default();
    spec.template.spec = Some(apply_rules(DEPLOYMENT_RULES, pod_spec, ctx)?);
    Ok(deployment)
}

fn http_encryption(gates: &FeatureGates) -> bool {
    gates.http_encryption
}

fn serving_certs_service(gates: &FeatureGates) -> bool {
    gates.http_encryption && gates.serving_certs_service
}

fn gateway_container(pod_spec: &mut PodSpec) -> Result<&mut Container> {
    pod_spec
        .containers
        .iter_mut()
        .find(|c| c.name == GATEWAY_CONTAINER_NAME)
        .ok_or_else(|| Error::ContainerNotFound(GATEWAY_CONTAINER_NAME.to_string()))
}

fn require_gateway_container(pod_spec: &mut PodSpec, _: &GatewayContext) -> Result<()> {
    gateway_container(pod_spec).map(|_| ())
}

fn configure_healthcheck_tls(pod_spec: &mut PodSpec, _: &GatewayContext) -> Result<()> {
    let gateway = gateway_container(pod_spec)?;

    let probes = [gateway.liveness_probe.as_mut(), gateway.readiness_probe.as_mut()];
    for probe in probes.into_iter().flatten() {
        if let Some(http_get) = probe.http_get.as_mut() {
            http_get.scheme = Some(PROBE_SCHEME_HTTPS.to_string());
        }
    }

    upsert_flag(
        gateway.args.get_or_insert_with(Vec::new),
        FLAG_HEALTHCHECKS_URL,
        &format!("https://localhost:{GATEWAY_HTTP_PORT}"),
    );
    Ok(())
}

// Talks to the upstream log endpoints over TLS verified against the platform's service CA.
fn configure_upstream_tls(pod_spec: &mut PodSpec, ctx: &GatewayContext) -> Result<()> {
    let ca_bundle = naming::ca_bundle_name(&ctx.stack_name);

    let gateway = gateway_container(pod_spec)?;
    let args = gateway.args.get_or_insert_with(Vec::new);
    for flag in [
        FLAG_LOGS_READ_ENDPOINT,
        FLAG_LOGS_TAIL_ENDPOINT,
        FLAG_LOGS_WRITE_ENDPOINT,
    ] {
        rewrite_flag(args, flag, with_https);
    }
    upsert_flag(args, FLAG_LOGS_TLS_CA_FILE, CA_FILE);

    upsert(
        gateway.volume_mounts.get_or_insert_with(Vec::new),
        VolumeMount {
            name: ca_bundle.clone(),
            read_only: Some(true),
            mount_path: CA_BUNDLE_DIR.to_string(),
            ..Default::default()
        },
    );
    upsert(
        pod_spec.volumes.get_or_insert_with(Vec::new),
        Volume {
            name: ca_bundle.clone(),
            config_map: Some(ConfigMapVolumeSource {
                name: Some(ca_bundle),
                default_mode: Some(DEFAULT_CONFIG_MAP_MODE),
                ..Default::default()
            }),
            ..Default::default()
        },
    );

    pod_spec.service_account_name = Some(naming::gateway_service_account_name(&ctx.stack_name));
    Ok(())
}

// Serves the gateway API over TLS using the serving certificate secret of the gateway service.
fn configure_server_tls(pod_spec: &mut PodSpec, ctx: &GatewayContext) -> Result<()> {
    let server_name = naming::service_fqdn(
        &naming::gateway_http_service_name(&ctx.stack_name),
        &ctx.stack_namespace,
    );

    let gateway = gateway_container(pod_spec)?;
    let args = gateway.args.get_or_insert_with(Vec::new);
    upsert_flag(args, FLAG_TLS_SERVER_CERT_FILE, TLS_CERT_FILE);
    upsert_flag(args, FLAG_TLS_SERVER_KEY_FILE, TLS_KEY_FILE);
    upsert_flag(args, FLAG_TLS_HEALTHCHECKS_CA_FILE, CA_FILE);
    upsert_flag(args, FLAG_TLS_HEALTHCHECKS_SERVER_NAME, &server_name);

    // A certificate mounted by the caller is left alone, together with whatever volume backs it.
    let mounted = insert_missing(
        gateway.volume_mounts.get_or_insert_with(Vec::new),
        tls_secret_mount(),
    );
    if mounted {
        insert_missing(
            pod_spec.volumes.get_or_insert_with(Vec::new),
            Volume {
                name: TLS_SECRET_VOLUME.to_string(),
                secret: Some(SecretVolumeSource {
                    secret_name: Some(naming::gateway_tls_secret_name(&ctx.stack_name)),
                    ..Default::default()
                }),
                ..Default::default()
            },
        );
    } else {
        debug!("gateway container already mounts {HTTP_TLS_DIR}");
    }
    Ok(())
}

fn configure_opa_sidecar(pod_spec: &mut PodSpec, ctx: &GatewayContext) -> Result<()> {
    let gates = &ctx.feature_gates;
    let tls_mount = if gates.http_encryption && gates.service_monitor_tls_endpoints {
        // Share whatever mount provides the serving certificate to the gateway container.
        let gateway = gateway_container(pod_spec)?;
        let mount = gateway
            .volume_mounts
            .as_deref()
            .and_then(|mounts| find(mounts, HTTP_TLS_DIR))
            .cloned()
            .unwrap_or_else(tls_secret_mount);
        Some(mount)
    } else {
        None
    };

    upsert(&mut pod_spec.containers, opa_container(ctx, tls_mount));
    Ok(())
}

fn tls_secret_mount() -> VolumeMount {
    VolumeMount {
        name: TLS_SECRET_VOLUME.to_string(),
        read_only: Some(true),
        mount_path: HTTP_TLS_DIR.to_string(),
        ..Default::default()
    }
}

// Builds the complete authorization sidecar. The sidecar is fully managed, so any previous
// version of it is replaced rather than merged.
fn opa_container(ctx: &GatewayContext, tls_mount: Option<VolumeMount>) -> Container {
    let mut args = vec![
        format!("--log.level={OPA_LOG_LEVEL}"),
        format!("--opa.package={OPA_DEFAULT_PACKAGE}"),
        format!("--opa.matcher={OPA_MATCHER}"),
        format!("--web.listen=:{OPA_HTTP_PORT}"),
        format!("--web.internal.listen=:{OPA_INTERNAL_PORT}"),
        format!("--web.healthchecks.url=http://localhost:{OPA_HTTP_PORT}"),
    ];
    if tls_mount.is_some() {
        args.push(format!("{FLAG_TLS_INTERNAL_CERT_FILE}={TLS_CERT_FILE}"));
        args.push(format!("{FLAG_TLS_INTERNAL_KEY_FILE}={TLS_KEY_FILE}"));
    }
    for tenant in &ctx.tenants {
        args.push(format!(
            "--openshift.mappings={tenant}={OPA_DEFAULT_API_GROUP}"
        ));
    }

    let scheme = if tls_mount.is_some() {
        PROBE_SCHEME_HTTPS
    } else {
        PROBE_SCHEME_HTTP
    };

    Container {
        name: OPA_CONTAINER_NAME.to_string(),
        image: Some(OPA_IMAGE.to_string()),
        args: Some(args),
        ports: Some(vec![
            ContainerPort {
                name: Some(OPA_HTTP_PORT_NAME.to_string()),
                container_port: OPA_HTTP_PORT,
                protocol: Some("TCP".to_string()),
                ..Default::default()
            },
            ContainerPort {
                name: Some(OPA_INTERNAL_PORT_NAME.to_string()),
                container_port: OPA_INTERNAL_PORT,
                protocol: Some("TCP".to_string()),
                ..Default::default()
            },
        ]),
        liveness_probe: Some(internal_probe("/live", scheme, 2, 30, 10)),
        readiness_probe: Some(internal_probe("/ready", scheme, 1, 5, 12)),
        volume_mounts: tls_mount.map(|m| vec![m]),
        ..Default::default()
    }
}

fn internal_probe(
    path: &str,
    scheme: &str,
    timeout_seconds: i32,
    period_seconds: i32,
    failure_threshold: i32,
) -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some(path.to_string()),
            port: IntOrString::Int(OPA_INTERNAL_PORT),
            scheme: Some(scheme.to_string()),
            ..Default::default()
        }),
        timeout_seconds: Some(timeout_seconds),
        period_seconds: Some(period_seconds),
        failure_threshold: Some(failure_threshold),
        ..Default::default()
    }
}
