//! Name derivation for models and properties.

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_name(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Display form of an API version: "v1beta1" becomes "V1Beta1".
pub fn version_qualifier(api_version: &str) -> String {
    let mut chars = api_version.chars();
    let titled: String = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    };
    titled.replace("alpha", "Alpha").replace("beta", "Beta")
}

/// Qualifier used to tell apart kinds that share a name and version across groups.
///
/// Uses the first DNS label of the group ("events.k8s.io" gives "Events");
/// the core group gives "Core".
pub fn group_qualifier(group: &str) -> String {
    let label = group.split('.').next().unwrap_or_default();
    if label.is_empty() {
        return "Core".to_string();
    }
    pascal_case(label)
}

/// Fallback qualifier built from every label of the group.
///
/// "apps.example.com" gives "AppsExampleCom"; the core group gives "Core".
pub fn full_group_qualifier(group: &str) -> String {
    let qualifier: String = group.split('.').map(pascal_case).collect();
    if qualifier.is_empty() {
        return "Core".to_string();
    }
    qualifier
}

/// Property name for a wire name.
///
/// Names with a leading `$` or `x-` lose the sigil and are PascalCased:
/// `$ref` becomes `Ref`, `x-kubernetes-list-type` becomes `KubernetesListType`.
/// Other names are only capitalized, so `external_id` stays distinct from
/// `externalId`.
pub fn sanitize_property_name(wire_name: &str) -> String {
    let stripped = match wire_name.strip_prefix('$') {
        Some(rest) => rest.trim_start_matches('$'),
        None => match wire_name.strip_prefix("x-") {
            Some(rest) => rest,
            None => return capitalize_name(wire_name),
        },
    };

    let sanitized = pascal_case(stripped);
    if sanitized.is_empty() {
        capitalize_name(wire_name)
    } else {
        sanitized
    }
}

/// Sort key for a property: its derived kind-name, then the raw wire name.
pub fn property_sort_key(wire_name: &str) -> (String, &str) {
    let last = wire_name.rsplit('.').next().unwrap_or(wire_name);
    (capitalize_name(last), wire_name)
}

fn pascal_case(text: &str) -> String {
    text.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(capitalize_name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalize_keeps_tail() {
        assert_eq!(capitalize_name("apiVersion"), "ApiVersion");
        assert_eq!(capitalize_name(""), "");
    }

    #[test]
    fn version_qualifier_recapitalizes_stability() {
        assert_eq!(version_qualifier("v1"), "V1");
        assert_eq!(version_qualifier("v1beta1"), "V1Beta1");
        assert_eq!(version_qualifier("v2alpha1"), "V2Alpha1");
        assert_eq!(version_qualifier(""), "");
    }

    #[test]
    fn group_qualifier_uses_first_label() {
        assert_eq!(group_qualifier("events.k8s.io"), "Events");
        assert_eq!(group_qualifier("flowcontrol.apiserver.k8s.io"), "Flowcontrol");
        assert_eq!(group_qualifier("resource-v2.example.com"), "ResourceV2");
        assert_eq!(group_qualifier(""), "Core");
    }

    #[test]
    fn full_group_qualifier_joins_labels() {
        assert_eq!(full_group_qualifier("apps.example.com"), "AppsExampleCom");
        assert_eq!(full_group_qualifier("apps"), "Apps");
        assert_eq!(full_group_qualifier("resource-v2.example.com"), "ResourceV2ExampleCom");
        assert_eq!(full_group_qualifier(""), "Core");
    }

    #[test]
    fn sanitize_strips_sigils() {
        assert_eq!(sanitize_property_name("$ref"), "Ref");
        assert_eq!(sanitize_property_name("$schema"), "Schema");
        assert_eq!(
            sanitize_property_name("x-kubernetes-list-type"),
            "KubernetesListType"
        );
        assert_eq!(sanitize_property_name("apiVersion"), "ApiVersion");
        assert_eq!(sanitize_property_name("$"), "$");
    }

    #[test]
    fn sanitize_leaves_plain_names_unsplit() {
        assert_eq!(sanitize_property_name("external_id"), "External_id");
        assert_eq!(sanitize_property_name("externalId"), "ExternalId");
        assert_eq!(sanitize_property_name("max-surge"), "Max-surge");
    }

    #[test]
    fn sort_key_uses_last_segment() {
        assert_eq!(property_sort_key("kind").0, "Kind");
        assert_eq!(property_sort_key("a.b.spec").0, "Spec");
    }
}
