use gateway_manifests::consts::*;
use gateway_manifests::*;
use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMapVolumeSource, Container, ContainerPort, HTTPGetAction, PodSpec, PodTemplateSpec,
    Probe, SecretVolumeSource, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

fn scheme_probe(scheme: &str) -> Option<Probe> {
    Some(Probe {
        http_get: Some(HTTPGetAction {
            scheme: Some(scheme.to_string()),
            ..Default::default()
        }),
        ..Default::default()
    })
}

fn args(args: &[&str]) -> Option<Vec<String>> {
    Some(args.iter().map(|a| a.to_string()).collect())
}

fn mount(name: &str, path: &str) -> VolumeMount {
    VolumeMount {
        name: name.to_string(),
        read_only: Some(true),
        mount_path: path.to_string(),
        ..Default::default()
    }
}

fn tls_secret_volume() -> Volume {
    Volume {
        name: TLS_SECRET_VOLUME.to_string(),
        secret: Some(SecretVolumeSource {
            secret_name: Some("test-gateway-http-tls".to_string()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn deployment(pod_spec: PodSpec) -> Deployment {
    Deployment {
        metadata: ObjectMeta {
            name: Some("gateway".to_string()),
            namespace: Some("test-ns".to_string()),
            ..Default::default()
        },
        spec: Some(DeploymentSpec {
            template: PodTemplateSpec {
                spec: Some(pod_spec),
                ..Default::default()
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn base_gateway(extra_args: &[&str], volume_mounts: Option<Vec<VolumeMount>>) -> Container {
    let mut all_args: Vec<&str> = extra_args.to_vec();
    all_args.extend([
        "--logs.read.endpoint=http://example.com",
        "--logs.tail.endpoint=http://example.com",
        "--logs.write.endpoint=http://example.com",
        "--web.healthchecks.url=http://localhost:8080",
    ]);
    Container {
        name: GATEWAY_CONTAINER_NAME.to_string(),
        args: args(&all_args),
        volume_mounts,
        readiness_probe: scheme_probe("HTTP"),
        liveness_probe: scheme_probe("HTTP"),
        ..Default::default()
    }
}

fn internal_probe(path: &str, scheme: &str, timeout: i32, period: i32, failures: i32) -> Probe {
    Probe {
        http_get: Some(HTTPGetAction {
            path: Some(path.to_string()),
            port: IntOrString::Int(OPA_INTERNAL_PORT),
            scheme: Some(scheme.to_string()),
            ..Default::default()
        }),
        timeout_seconds: Some(timeout),
        period_seconds: Some(period),
        failure_threshold: Some(failures),
        ..Default::default()
    }
}

fn opa_sidecar(tls: bool) -> Container {
    let mut opa_args = vec![
        "--log.level=warn",
        "--opa.package=lokistack",
        "--opa.matcher=kubernetes_namespace_name",
        "--web.listen=:8082",
        "--web.internal.listen=:8083",
        "--web.healthchecks.url=http://localhost:8082",
    ];
    if tls {
        opa_args.extend([
            "--tls.internal.server.cert-file=/var/run/tls/http/tls.crt",
            "--tls.internal.server.key-file=/var/run/tls/http/tls.key",
        ]);
    }
    opa_args.extend([
        "--openshift.mappings=application=loki.grafana.com",
        "--openshift.mappings=audit=loki.grafana.com",
        "--openshift.mappings=infrastructure=loki.grafana.com",
    ]);
    let scheme = if tls { "HTTPS" } else { "HTTP" };

    Container {
        name: OPA_CONTAINER_NAME.to_string(),
        image: Some("quay.io/observatorium/opa-openshift:latest".to_string()),
        args: args(&opa_args),
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
        volume_mounts: tls.then(|| vec![mount(TLS_SECRET_VOLUME, HTTP_TLS_DIR)]),
        ..Default::default()
    }
}

fn ctx(feature_gates: FeatureGates) -> GatewayContext {
    GatewayContext::new(
        TenancyMode::OpenshiftLogging,
        feature_gates,
        "test",
        "test-ns",
        ["infrastructure", "application", "audit"],
    )
}

struct TestCase {
    desc: &'static str,
    feature_gates: FeatureGates,
    dpl: Deployment,
    want: Deployment,
}

fn cases() -> Vec<TestCase> {
    vec![
        TestCase {
            desc: "openshift-logging mode",
            feature_gates: FeatureGates::default(),
            dpl: deployment(PodSpec {
                containers: vec![base_gateway(&[], None)],
                ..Default::default()
            }),
            want: deployment(PodSpec {
                containers: vec![base_gateway(&[], None), opa_sidecar(false)],
                ..Default::default()
            }),
        },
        TestCase {
            desc: "openshift-logging mode with-http-encryption",
            feature_gates: FeatureGates {
                http_encryption: true,
                ..Default::default()
            },
            dpl: deployment(PodSpec {
                containers: vec![base_gateway(&[], None)],
                ..Default::default()
            }),
            want: deployment(PodSpec {
                containers: vec![
                    Container {
                        args: args(&[
                            "--logs.read.endpoint=http://example.com",
                            "--logs.tail.endpoint=http://example.com",
                            "--logs.write.endpoint=http://example.com",
                            "--web.healthchecks.url=https://localhost:8080",
                            "--tls.server.cert-file=/var/run/tls/http/tls.crt",
                            "--tls.server.key-file=/var/run/tls/http/tls.key",
                            "--tls.healthchecks.server-ca-file=/var/run/ca/service-ca.crt",
                            "--tls.healthchecks.server-name=test-gateway-http.test-ns.svc.cluster.local",
                        ]),
                        volume_mounts: Some(vec![mount(TLS_SECRET_VOLUME, HTTP_TLS_DIR)]),
                        readiness_probe: scheme_probe("HTTPS"),
                        liveness_probe: scheme_probe("HTTPS"),
                        ..base_gateway(&[], None)
                    },
                    opa_sidecar(false),
                ],
                volumes: Some(vec![tls_secret_volume()]),
                ..Default::default()
            }),
        },
        TestCase {
            desc: "openshift-logging mode with-tls-service-monitor-config",
            feature_gates: FeatureGates {
                http_encryption: true,
                service_monitor_tls_endpoints: true,
                ..Default::default()
            },
            dpl: deployment(PodSpec {
                containers: vec![base_gateway(
                    &[],
                    Some(vec![mount(TLS_SECRET_VOLUME, HTTP_TLS_DIR)]),
                )],
                volumes: Some(vec![tls_secret_volume()]),
                ..Default::default()
            }),
            want: deployment(PodSpec {
                containers: vec![
                    Container {
                        args: args(&[
                            "--logs.read.endpoint=http://example.com",
                            "--logs.tail.endpoint=http://example.com",
                            "--logs.write.endpoint=http://example.com",
                            "--web.healthchecks.url=https://localhost:8080",
                            "--tls.server.cert-file=/var/run/tls/http/tls.crt",
                            "--tls.server.key-file=/var/run/tls/http/tls.key",
                            "--tls.healthchecks.server-ca-file=/var/run/ca/service-ca.crt",
                            "--tls.healthchecks.server-name=test-gateway-http.test-ns.svc.cluster.local",
                        ]),
                        volume_mounts: Some(vec![mount(TLS_SECRET_VOLUME, HTTP_TLS_DIR)]),
                        readiness_probe: scheme_probe("HTTPS"),
                        liveness_probe: scheme_probe("HTTPS"),
                        ..base_gateway(&[], None)
                    },
                    opa_sidecar(true),
                ],
                volumes: Some(vec![tls_secret_volume()]),
                ..Default::default()
            }),
        },
        TestCase {
            desc: "openshift-logging mode with-cert-signing-service",
            feature_gates: FeatureGates {
                http_encryption: true,
                service_monitor_tls_endpoints: true,
                serving_certs_service: true,
            },
            dpl: deployment(PodSpec {
                containers: vec![base_gateway(
                    &["--other.args=foo-bar"],
                    Some(vec![mount("tls-secret", "/var/run/tls/http")]),
                )],
                volumes: Some(vec![Volume {
                    name: "tls-secret-volume".to_string(),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            want: deployment(PodSpec {
                service_account_name: Some("test-gateway".to_string()),
                containers: vec![
                    Container {
                        args: args(&[
                            "--other.args=foo-bar",
                            "--logs.read.endpoint=https://example.com",
                            "--logs.tail.endpoint=https://example.com",
                            "--logs.write.endpoint=https://example.com",
                            "--web.healthchecks.url=https://localhost:8080",
                            "--logs.tls.ca-file=/var/run/ca/service-ca.crt",
                            "--tls.server.cert-file=/var/run/tls/http/tls.crt",
                            "--tls.server.key-file=/var/run/tls/http/tls.key",
                            "--tls.healthchecks.server-ca-file=/var/run/ca/service-ca.crt",
                            "--tls.healthchecks.server-name=test-gateway-http.test-ns.svc.cluster.local",
                        ]),
                        volume_mounts: Some(vec![
                            mount("tls-secret", "/var/run/tls/http"),
                            mount("test-ca-bundle", "/var/run/ca"),
                        ]),
                        readiness_probe: scheme_probe("HTTPS"),
                        liveness_probe: scheme_probe("HTTPS"),
                        ..base_gateway(&[], None)
                    },
                    opa_sidecar(true),
                ],
                volumes: Some(vec![
                    Volume {
                        name: "tls-secret-volume".to_string(),
                        ..Default::default()
                    },
                    Volume {
                        name: "test-ca-bundle".to_string(),
                        config_map: Some(ConfigMapVolumeSource {
                            name: Some("test-ca-bundle".to_string()),
                            default_mode: Some(420),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                ]),
                ..Default::default()
            }),
        },
    ]
}

#[test]
fn configure_deployment_for_mode_table() {
    for tc in cases() {
        let got = configure_deployment_for_mode(tc.dpl, &ctx(tc.feature_gates))
            .unwrap_or_else(|e| panic!("{}: {e}", tc.desc));
        assert_eq!(got, tc.want, "{}", tc.desc);
    }
}

#[test]
fn configure_deployment_for_mode_is_idempotent() {
    for tc in cases() {
        let ctx = ctx(tc.feature_gates);
        let once = configure_deployment_for_mode(tc.dpl, &ctx).unwrap();
        let twice = configure_deployment_for_mode(once.clone(), &ctx).unwrap();
        assert_eq!(once, twice, "{}", tc.desc);
    }
}

#[test]
fn static_and_dynamic_modes_leave_deployment_unchanged() {
    for mode in [TenancyMode::Static, TenancyMode::Dynamic] {
        for tc in cases() {
            let ctx = GatewayContext {
                mode,
                ..ctx(tc.feature_gates)
            };
            let got = configure_deployment_for_mode(tc.dpl.clone(), &ctx).unwrap();
            assert_eq!(got, tc.dpl, "{mode:?} {}", tc.desc);
        }
    }
}
