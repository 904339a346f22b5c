use std::collections::BTreeMap;

use crate::consts::{self, ComponentType};

/// Standard labels of every object rendered for a cluster component
pub fn render_labels(component: ComponentType, cluster_name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (consts::LABEL_NAME_KEY.to_string(), consts::LABEL_NAME_VALUE.to_string()),
        (consts::LABEL_INSTANCE_KEY.to_string(), cluster_name.to_string()),
        (consts::LABEL_COMPONENT_KEY.to_string(), component.as_str().to_string()),
        (consts::LABEL_PART_OF_KEY.to_string(), consts::LABEL_PART_OF_VALUE.to_string()),
        (consts::LABEL_MANAGED_BY_KEY.to_string(), consts::LABEL_MANAGED_BY_VALUE.to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_labels() {
        let labels = render_labels(ComponentType::Login, "slurm1");
        assert_eq!(labels.len(), 5);
        assert_eq!(labels["app.kubernetes.io/instance"], "slurm1");
        assert_eq!(labels["app.kubernetes.io/component"], "login");
    }
}
