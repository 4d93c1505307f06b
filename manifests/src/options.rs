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

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    consts::{GATEWAY_HTTP_PORT_NAME, LABEL_GATEWAY_COMPONENT},
    credentials::apply_credentials,
    naming, Error, Result,
};

/// How requests to the gateway are authenticated and authorized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenancyMode {
    #[default]
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "dynamic")]
    Dynamic,
    #[serde(rename = "openshift-logging")]
    OpenshiftLogging,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct FeatureGates {
    pub http_encryption: bool,
    #[serde(alias = "serviceMonitorTLSEndpoints")]
    pub service_monitor_tls_endpoints: bool,
    pub serving_certs_service: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackIdentity {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub base_domain: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct TenantOpenShiftSpec {
    pub cookie_secret: String,
    #[serde(rename = "tenantID")]
    pub tenant_id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TenantConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openshift: Option<TenantOpenShiftSpec>,
}

/// Per-tenant configuration keyed by tenant name. Iteration is always in name order.
pub type TenantConfigs = BTreeMap<String, TenantConfig>;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationSpec {
    pub tenant_name: String,
    #[serde(rename = "tenantID")]
    pub tenant_id: String,
    pub cookie_secret: String,
    pub service_account: String,
    #[serde(rename = "redirectURL")]
    pub redirect_url: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationSpec {
    #[serde(rename = "opaURL")]
    pub opa_url: String,
}

// Names and labels shared by all gateway objects of a stack.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildOptions {
    pub loki_stack_name: String,
    pub loki_stack_namespace: String,
    pub gateway_name: String,
    pub gateway_svc_name: String,
    pub gateway_svc_target_port: String,
    pub labels: BTreeMap<String, String>,
}

impl BuildOptions {
    pub fn new(stack_name: &str, stack_namespace: &str) -> Self {
        BuildOptions {
            loki_stack_name: stack_name.to_string(),
            loki_stack_namespace: stack_namespace.to_string(),
            gateway_name: naming::gateway_name(stack_name),
            gateway_svc_name: naming::gateway_http_service_name(stack_name),
            gateway_svc_target_port: GATEWAY_HTTP_PORT_NAME.to_string(),
            labels: naming::component_labels(LABEL_GATEWAY_COMPONENT, stack_name),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenShiftOptions {
    pub build: BuildOptions,
    pub authentication: Vec<AuthenticationSpec>,
    pub authorization: AuthorizationSpec,
}

/// Inputs of one gateway manifest pass for a single stack.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Options {
    pub name: String,
    pub namespace: String,
    #[serde(default)]
    pub gateway_base_domain: String,
    #[serde(default)]
    pub mode: TenancyMode,
    #[serde(default)]
    pub feature_gates: FeatureGates,
    #[serde(default)]
    pub tenants: TenantConfigs,
    #[serde(default, skip_serializing)]
    pub openshift: OpenShiftOptions,
}

impl Options {
    pub fn identity(&self) -> StackIdentity {
        StackIdentity {
            name: self.name.clone(),
            namespace: self.namespace.clone(),
            base_domain: self.gateway_base_domain.clone(),
        }
    }

    /// Fills the OpenShift options with build names and tenant credentials.
    ///
    /// Static and dynamic stacks are left untouched. Credentials already present on the tenant
    /// configuration are reused; missing ones are generated.
    pub fn apply_gateway_defaults(&mut self) -> Result<()> {
        if self.mode != TenancyMode::OpenshiftLogging {
            return Ok(());
        }
        self.validate()?;
        let (authentication, authorization) =
            apply_credentials(&self.tenants, &self.identity(), self.mode)?;
        self.openshift = OpenShiftOptions {
            build: BuildOptions::new(&self.name, &self.namespace),
            authentication,
            authorization,
        };
        Ok(())
    }

    // Rejects identities that would produce unusable names or redirect URLs.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidInput("stack name must not be empty".to_string()));
        }
        if self.namespace.is_empty() {
            return Err(Error::InvalidInput(
                "stack namespace must not be empty".to_string(),
            ));
        }
        if self.mode == TenancyMode::OpenshiftLogging && self.gateway_base_domain.is_empty() {
            return Err(Error::InvalidInput(
                "gateway base domain is required in openshift-logging mode".to_string(),
            ));
        }
        Ok(())
    }

    pub fn gateway_context(&self) -> GatewayContext {
        GatewayContext {
            mode: self.mode,
            feature_gates: self.feature_gates,
            stack_name: self.name.clone(),
            stack_namespace: self.namespace.clone(),
            tenants: self.tenants.keys().cloned().collect(),
        }
    }
}

/// Everything the mutators need to know about the stack they run for.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GatewayContext {
    pub mode: TenancyMode,
    pub feature_gates: FeatureGates,
    pub stack_name: String,
    pub stack_namespace: String,
    // Configured tenant names, sorted.
    pub tenants: Vec<String>,
}

impl GatewayContext {
    pub fn new(
        mode: TenancyMode,
        feature_gates: FeatureGates,
        stack_name: &str,
        stack_namespace: &str,
        tenants: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        let mut tenants: Vec<String> = tenants.into_iter().map(Into::into).collect();
        tenants.sort();
        tenants.dedup();
        GatewayContext {
            mode,
            feature_gates,
            stack_name: stack_name.to_string(),
            stack_namespace: stack_namespace.to_string(),
            tenants,
        }
    }
}
