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

use std::{
    fs,
    io::{self, Read, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use gateway_manifests::*;
use serde::{Deserialize, Serialize};
use tracing::*;
use tracing_subscriber::EnvFilter;

// Renders the tenancy dependent parts of a stack's gateway manifests.
#[derive(Debug, Parser)]
struct Opt {
    /// YAML bundle holding `options`, `deployment`, `service` and optionally `serviceMonitor`.
    /// Use `-` to read from stdin.
    #[clap(short, long, default_value = "-")]
    input: String,
    /// Where to write the rendered objects. Defaults to stdout.
    #[clap(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct Bundle {
    options: Options,
    #[serde(flatten)]
    objects: GatewayObjects,
}

// Tenant configuration including any credentials generated during this run. Feed it back as
// `options.tenants` on the next run to keep the credentials stable.
#[derive(Debug, Serialize)]
struct TenantsDocument<'a> {
    tenants: &'a TenantConfigs,
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let raw = read_input(&opt.input)?;
    let rendered = render(&raw)?;

    match &opt.output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout().write_all(rendered.as_bytes())?,
    }
    Ok(())
}

// Decodes a bundle, applies the gateway defaults and mutators and returns the resulting objects
// followed by the tenants document as one multi-document YAML stream.
fn render(raw: &str) -> anyhow::Result<String> {
    let mut bundle: Bundle =
        serde_yaml::from_str(raw).context("failed to decode the input bundle")?;

    let options = &mut bundle.options;
    options.apply_gateway_defaults()?;
    persist_credentials(&mut options.tenants, &options.openshift.authentication);

    let objects = configure_gateway_objects(&bundle.objects, &options.gateway_context())?;

    let mut docs = vec![
        serde_yaml::to_string(&objects.deployment)?,
        serde_yaml::to_string(&objects.service)?,
    ];
    if let Some(sm) = &objects.service_monitor {
        docs.push(serde_yaml::to_string(sm)?);
    }
    docs.push(serde_yaml::to_string(&TenantsDocument {
        tenants: &options.tenants,
    })?);

    info!(stack = %options.name, documents = docs.len(), "rendered gateway manifests");
    Ok(docs.join("---\n"))
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut raw = String::new();
        io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read stdin")?;
        return Ok(raw);
    }
    fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
}
