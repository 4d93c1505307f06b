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

//! Canonical names, URLs and labels derived from a stack identity.

use std::collections::BTreeMap;

use crate::consts::{OPA_DEFAULT_PACKAGE, OPA_HTTP_PORT};

pub fn gateway_name(stack_name: &str) -> String {
    format!("{stack_name}-gateway")
}

pub fn gateway_http_service_name(stack_name: &str) -> String {
    format!("{stack_name}-gateway-http")
}

// The gateway runs under a service account named after the gateway itself.
pub fn gateway_service_account_name(stack_name: &str) -> String {
    gateway_name(stack_name)
}

pub fn gateway_tls_secret_name(stack_name: &str) -> String {
    format!("{}-http-tls", gateway_name(stack_name))
}

pub fn ca_bundle_name(stack_name: &str) -> String {
    format!("{stack_name}-ca-bundle")
}

// Returns the in-cluster DNS name of a Service.
pub fn service_fqdn(service_name: &str, namespace: &str) -> String {
    format!("{service_name}.{namespace}.svc.cluster.local")
}

// Returns the OAuth callback URL the platform redirects a tenant's login flow to.
pub fn redirect_url(stack_name: &str, namespace: &str, base_domain: &str, tenant: &str) -> String {
    format!("https://{stack_name}-{namespace}.apps.{base_domain}/openshift/{tenant}/callback")
}

// Returns the local address the gateway queries for authorization decisions.
pub fn opa_url() -> String {
    format!("http://localhost:{OPA_HTTP_PORT}/v1/data/{OPA_DEFAULT_PACKAGE}/allow")
}

/// Returns the common label set for a component of a stack.
pub fn component_labels(component: &str, stack_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("app.kubernetes.io/name".to_string(), "lokistack".to_string()),
        ("app.kubernetes.io/instance".to_string(), stack_name.to_string()),
        ("app.kubernetes.io/provider".to_string(), "openshift".to_string()),
        (
            "app.kubernetes.io/managed-by".to_string(),
            "lokistack-controller".to_string(),
        ),
        ("app.kubernetes.io/component".to_string(), component.to_string()),
    ])
}
