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

use tracing::debug;

use crate::{FeatureGates, GatewayContext, Result, TenancyMode};

/// One row of a mode and feature gate policy table.
///
/// A rule applies when the context's tenancy mode is listed in `modes` and `gate` holds for the
/// context's feature gates. Rules are evaluated in table order, so later rows see the effects of
/// earlier ones.
pub struct Rule<T> {
    pub name: &'static str,
    pub modes: &'static [TenancyMode],
    pub gate: fn(&FeatureGates) -> bool,
    pub apply: fn(&mut T, &GatewayContext) -> Result<()>,
}

impl<T> Rule<T> {
    fn matches(&self, ctx: &GatewayContext) -> bool {
        self.modes.contains(&ctx.mode) && (self.gate)(&ctx.feature_gates)
    }
}

pub fn always(_: &FeatureGates) -> bool {
    true
}

pub fn any_applies<T>(rules: &[Rule<T>], ctx: &GatewayContext) -> bool {
    rules.iter().any(|r| r.matches(ctx))
}

// Runs every matching rule against the target and returns the result. The first failing rule
// aborts the run and the partially mutated target is dropped.
pub fn apply_rules<T>(rules: &[Rule<T>], mut target: T, ctx: &GatewayContext) -> Result<T> {
    for rule in rules.iter().filter(|r| r.matches(ctx)) {
        debug!(rule = rule.name, mode = ?ctx.mode, "applying manifest rule");
        (rule.apply)(&mut target, ctx)?;
    }
    Ok(target)
}
