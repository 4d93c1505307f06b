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

use std::collections::BTreeSet;

use rand::{rngs::OsRng, CryptoRng, RngCore};
use tracing::{debug, info};

use crate::{
    consts::COOKIE_SECRET_LENGTH, naming, AuthenticationSpec, AuthorizationSpec, Error, Result,
    StackIdentity, TenancyMode, TenantConfigs,
};

const COOKIE_SECRET_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

// Bytes at or above this bound are rejected so every alphabet symbol is equally likely.
const COOKIE_SECRET_BYTE_BOUND: usize = COOKIE_SECRET_ALPHABET.len() * 4;

const MAX_SECRET_ATTEMPTS: usize = 8;

/// Derives the authentication and authorization settings for every tenant of an
/// OpenShift-integrated stack, drawing new secrets from the operating system's CSPRNG.
///
/// See [`apply_credentials_with_rng`].
pub fn apply_credentials(
    tenants: &TenantConfigs,
    identity: &StackIdentity,
    mode: TenancyMode,
) -> Result<(Vec<AuthenticationSpec>, AuthorizationSpec)> {
    apply_credentials_with_rng(tenants, identity, mode, &mut OsRng)
}

/// Derives the authentication and authorization settings for every tenant.
///
/// Tenants are visited in name order. A tenant that already carries a cookie secret or tenant
/// ID keeps it; missing values are generated from `rng`. Cookie secrets must be unique across
/// tenants. Redirect URL and service account are
/// always recomputed from the stack identity. Any mode other than
/// [`TenancyMode::OpenshiftLogging`] yields empty settings.
///
/// Generated values only survive the next pass if the caller writes them back with
/// [`persist_credentials`].
pub fn apply_credentials_with_rng<R: RngCore + CryptoRng>(
    tenants: &TenantConfigs,
    identity: &StackIdentity,
    mode: TenancyMode,
    rng: &mut R,
) -> Result<(Vec<AuthenticationSpec>, AuthorizationSpec)> {
    if mode != TenancyMode::OpenshiftLogging {
        return Ok((vec![], AuthorizationSpec::default()));
    }

    let service_account = naming::gateway_service_account_name(&identity.name);
    let mut secrets_in_use = BTreeSet::new();
    for (name, tenant) in tenants {
        let Some(spec) = tenant.openshift.as_ref() else {
            continue;
        };
        if !spec.cookie_secret.is_empty() && !secrets_in_use.insert(spec.cookie_secret.clone()) {
            return Err(Error::InvalidTenantConfig(format!(
                "tenant {name} reuses the cookie secret of another tenant"
            )));
        }
    }

    let mut authentication = Vec::with_capacity(tenants.len());
    for (name, tenant) in tenants {
        let spec = tenant.openshift.as_ref().ok_or_else(|| {
            Error::InvalidTenantConfig(format!(
                "tenant {name} is missing its openshift configuration"
            ))
        })?;

        let cookie_secret = if spec.cookie_secret.is_empty() {
            let secret = unique_cookie_secret(rng, &mut secrets_in_use)?;
            info!(tenant = %name, "generated cookie secret");
            secret
        } else if spec.cookie_secret.chars().count() != COOKIE_SECRET_LENGTH {
            return Err(Error::InvalidTenantConfig(format!(
                "cookie secret of tenant {name} must be {COOKIE_SECRET_LENGTH} characters long"
            )));
        } else {
            spec.cookie_secret.clone()
        };

        let tenant_id = if spec.tenant_id.is_empty() {
            let id = generate_tenant_id(rng)?;
            info!(tenant = %name, tenant_id = %id, "generated tenant id");
            id
        } else {
            spec.tenant_id.clone()
        };

        authentication.push(AuthenticationSpec {
            tenant_name: name.clone(),
            tenant_id,
            cookie_secret,
            service_account: service_account.clone(),
            redirect_url: naming::redirect_url(
                &identity.name,
                &identity.namespace,
                &identity.base_domain,
                name,
            ),
        });
    }
    debug!(tenants = authentication.len(), "applied tenant credentials");

    Ok((
        authentication,
        AuthorizationSpec {
            opa_url: naming::opa_url(),
        },
    ))
}

/// Writes tenant IDs and cookie secrets back onto the tenant configuration so the next call to
/// [`apply_credentials`] preserves them. Settings for unknown tenants are ignored.
pub fn persist_credentials(tenants: &mut TenantConfigs, authentication: &[AuthenticationSpec]) {
    for authn in authentication {
        if let Some(tenant) = tenants.get_mut(&authn.tenant_name) {
            let spec = tenant.openshift.get_or_insert_with(Default::default);
            spec.cookie_secret.clone_from(&authn.cookie_secret);
            spec.tenant_id.clone_from(&authn.tenant_id);
        }
    }
}

fn unique_cookie_secret<R: RngCore + CryptoRng>(
    rng: &mut R,
    in_use: &mut BTreeSet<String>,
) -> Result<String> {
    for _ in 0..MAX_SECRET_ATTEMPTS {
        let secret = generate_cookie_secret(rng)?;
        if in_use.insert(secret.clone()) {
            return Ok(secret);
        }
    }
    Err(Error::SecretGenerationError(rand::Error::new(
        "random source keeps repeating cookie secrets",
    )))
}

fn generate_cookie_secret<R: RngCore + CryptoRng>(rng: &mut R) -> Result<String> {
    let mut secret = String::with_capacity(COOKIE_SECRET_LENGTH);
    let mut buf = [0u8; 2 * COOKIE_SECRET_LENGTH];
    while secret.len() < COOKIE_SECRET_LENGTH {
        rng.try_fill_bytes(&mut buf)
            .map_err(Error::SecretGenerationError)?;
        for b in buf {
            let b = b as usize;
            if b >= COOKIE_SECRET_BYTE_BOUND {
                continue;
            }
            secret.push(COOKIE_SECRET_ALPHABET[b % COOKIE_SECRET_ALPHABET.len()] as char);
            if secret.len() == COOKIE_SECRET_LENGTH {
                break;
            }
        }
    }
    Ok(secret)
}

fn generate_tenant_id<R: RngCore + CryptoRng>(rng: &mut R) -> Result<String> {
    let mut bytes = [0u8; 16];
    rng.try_fill_bytes(&mut bytes)
        .map_err(Error::SecretGenerationError)?;
    Ok(uuid::Builder::from_random_bytes(bytes)
        .into_uuid()
        .to_string())
}
