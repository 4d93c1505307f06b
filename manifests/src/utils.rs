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

use crate::traits::Keyed;

// Replaces the item with the same key as the provided one, or appends it if no such item exists.
// The position of an existing item is kept so repeated calls converge on the same list.
pub fn upsert<T: Keyed>(items: &mut Vec<T>, item: T) {
    if let Some(existing) = items.iter_mut().find(|i| i.key() == item.key()) {
        *existing = item;
        return;
    }
    items.push(item);
}

// Appends the provided item only if no item with the same key exists yet. Returns true if the
// item was added.
pub fn insert_missing<T: Keyed>(items: &mut Vec<T>, item: T) -> bool {
    if items.iter().any(|i| i.key() == item.key()) {
        return false;
    }
    items.push(item);
    true
}

pub fn find<'a, T: Keyed>(items: &'a [T], key: &str) -> Option<&'a T> {
    items.iter().find(|i| i.key() == key)
}

// Sets `--flag=value` on an argument list, replacing any previous value of the same flag.
pub fn upsert_flag(args: &mut Vec<String>, flag: &str, value: &str) {
    let arg = format!("{flag}={value}");
    if let Some(existing) = args.iter_mut().find(|a| flag_matches(a, flag)) {
        *existing = arg;
        return;
    }
    args.push(arg);
}

// Rewrites the value of a flag in place. Flags that are not present are left alone.
pub fn rewrite_flag<F>(args: &mut [String], flag: &str, rewrite: F)
where
    F: Fn(&str) -> String,
{
    for arg in args.iter_mut().filter(|a| flag_matches(a, flag)) {
        let value = rewrite(&arg[flag.len() + 1..]);
        *arg = format!("{flag}={value}");
    }
}

fn flag_matches(arg: &str, flag: &str) -> bool {
    arg.strip_prefix(flag)
        .is_some_and(|rest| rest.starts_with('='))
}

// Switches a URL to https. Any other scheme is left as is.
pub fn with_https(url: &str) -> String {
    match url.strip_prefix("http://") {
        Some(rest) => format!("https://{rest}"),
        None => url.to_string(),
    }
}
