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

// Name of the primary gateway container inside the gateway Deployment.
pub const GATEWAY_CONTAINER_NAME: &str = "gateway";

// Port the gateway serves its public HTTP API on.
pub const GATEWAY_HTTP_PORT: i32 = 8080;

// Target port name of the gateway HTTP Service.
pub const GATEWAY_HTTP_PORT_NAME: &str = "public";

// Component label value for the gateway.
pub const LABEL_GATEWAY_COMPONENT: &str = "lokistack-gateway";

// Directory the serving certificate secret is mounted at.
pub const HTTP_TLS_DIR: &str = "/var/run/tls/http";
pub const TLS_CERT_FILE: &str = "/var/run/tls/http/tls.crt";
pub const TLS_KEY_FILE: &str = "/var/run/tls/http/tls.key";
pub const TLS_SECRET_VOLUME: &str = "tls-secret";

// Directory the service CA bundle config map is mounted at.
pub const CA_BUNDLE_DIR: &str = "/var/run/ca";
pub const CA_FILE: &str = "/var/run/ca/service-ca.crt";

// File mode of the projected CA bundle (0644).
pub const DEFAULT_CONFIG_MAP_MODE: i32 = 420;

pub const BEARER_TOKEN_FILE: &str = "/var/run/secrets/kubernetes.io/serviceaccount/token";

// Authorization (OPA) sidecar.
pub const OPA_CONTAINER_NAME: &str = "opa";
pub const OPA_IMAGE: &str = "quay.io/observatorium/opa-openshift:latest";
pub const OPA_HTTP_PORT: i32 = 8082;
pub const OPA_HTTP_PORT_NAME: &str = "public";
pub const OPA_INTERNAL_PORT: i32 = 8083;
pub const OPA_INTERNAL_PORT_NAME: &str = "opa-metrics";
pub const OPA_DEFAULT_PACKAGE: &str = "lokistack";
pub const OPA_DEFAULT_API_GROUP: &str = "loki.grafana.com";
pub const OPA_MATCHER: &str = "kubernetes_namespace_name";
pub const OPA_LOG_LEVEL: &str = "warn";

pub const METRICS_PATH: &str = "/metrics";

// Length of generated cookie secrets.
pub const COOKIE_SECRET_LENGTH: usize = 32;

// Gateway command line flags. These are the wire contract with the gateway binary.
pub const FLAG_HEALTHCHECKS_URL: &str = "--web.healthchecks.url";
pub const FLAG_LOGS_READ_ENDPOINT: &str = "--logs.read.endpoint";
pub const FLAG_LOGS_TAIL_ENDPOINT: &str = "--logs.tail.endpoint";
pub const FLAG_LOGS_WRITE_ENDPOINT: &str = "--logs.write.endpoint";
pub const FLAG_LOGS_TLS_CA_FILE: &str = "--logs.tls.ca-file";
pub const FLAG_TLS_SERVER_CERT_FILE: &str = "--tls.server.cert-file";
pub const FLAG_TLS_SERVER_KEY_FILE: &str = "--tls.server.key-file";
pub const FLAG_TLS_HEALTHCHECKS_CA_FILE: &str = "--tls.healthchecks.server-ca-file";
pub const FLAG_TLS_HEALTHCHECKS_SERVER_NAME: &str = "--tls.healthchecks.server-name";
pub const FLAG_TLS_INTERNAL_CERT_FILE: &str = "--tls.internal.server.cert-file";
pub const FLAG_TLS_INTERNAL_KEY_FILE: &str = "--tls.internal.server.key-file";
