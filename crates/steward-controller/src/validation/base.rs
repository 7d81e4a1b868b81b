//! Validation of `spec.master`

use steward_common::crd::Jenkins;
use steward_common::plugins::PluginGraph;
use steward_common::Error;
use tracing::warn;

use super::Validation;
use crate::image::is_valid_image;
use crate::provisioner::BaseProvisioner;

/// Validate the master section of the spec.
///
/// Checks the image reference, parses both plugin groups into one graph and
/// verifies it, then asks the base provisioner for its own verdict.
pub async fn validate_base(
    jenkins: &Jenkins,
    provisioner: &dyn BaseProvisioner,
) -> Result<Validation, Error> {
    let master = &jenkins.spec.master;
    let mut validation = Validation::valid();

    if master.image.trim().is_empty() {
        warn!("image not set");
        validation.push("image not set");
    } else if !is_valid_image(&master.image) {
        warn!(image = %master.image, "invalid image");
        validation.push(format!("invalid image '{}'", master.image));
    }

    let graph = PluginGraph::from_groups(&master.operator_plugins, &master.plugins);
    for invalid in graph.invalid_tokens() {
        warn!(plugin = %invalid.error, origin = %invalid.origin, "invalid plugin name");
        validation.push(invalid.to_string());
    }
    // Conflicts are only meaningful once every token parsed
    if graph.invalid_tokens().is_empty() {
        for conflict in graph.conflicts() {
            warn!(plugin = %conflict.name, "{conflict}");
            validation.push(conflict.to_string());
        }
    }

    if !provisioner.validate(jenkins).await? {
        warn!("base provisioner rejected the spec");
        validation.push("rejected by base provisioner");
    }

    Ok(validation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioner::MockBaseProvisioner;
    use std::collections::BTreeMap;
    use steward_common::crd::{JenkinsSpec, MasterSpec};

    fn jenkins(image: &str, plugins: &[(&str, &[&str])]) -> Jenkins {
        let plugins: BTreeMap<String, Vec<String>> = plugins
            .iter()
            .map(|(root, deps)| {
                (
                    root.to_string(),
                    deps.iter().map(|d| d.to_string()).collect(),
                )
            })
            .collect();
        let mut jenkins = Jenkins::new(
            "ci",
            JenkinsSpec {
                master: MasterSpec {
                    image: image.to_string(),
                    operator_plugins: BTreeMap::from([(
                        "git:3.9.1".to_string(),
                        vec!["structs:1.17".to_string()],
                    )]),
                    plugins,
                    ..Default::default()
                },
                seed_jobs: vec![],
            },
        );
        jenkins.metadata.namespace = Some("default".to_string());
        jenkins
    }

    fn accepting_provisioner() -> MockBaseProvisioner {
        let mut provisioner = MockBaseProvisioner::new();
        provisioner.expect_validate().returning(|_| Ok(true));
        provisioner
    }

    #[tokio::test]
    async fn valid_spec_passes() {
        let jenkins = jenkins("jenkins/jenkins:lts", &[("job-dsl:1.70", &["structs:1.17"])]);
        let validation = validate_base(&jenkins, &accepting_provisioner())
            .await
            .unwrap();
        assert!(validation.is_valid(), "{validation}");
    }

    #[tokio::test]
    async fn empty_image_is_invalid() {
        let jenkins = jenkins("", &[]);
        let validation = validate_base(&jenkins, &accepting_provisioner())
            .await
            .unwrap();
        assert_eq!(validation.violations(), ["image not set"]);
    }

    #[tokio::test]
    async fn malformed_image_is_invalid() {
        let jenkins = jenkins("Jenkins/Jenkins:lts", &[]);
        let validation = validate_base(&jenkins, &accepting_provisioner())
            .await
            .unwrap();
        assert!(!validation.is_valid());
        assert!(validation.violations()[0].contains("invalid image"));
    }

    #[tokio::test]
    async fn conflicting_plugin_versions_are_invalid() {
        let jenkins = jenkins("jenkins/jenkins:lts", &[("job-dsl:1.70", &["structs:1.14"])]);
        let validation = validate_base(&jenkins, &accepting_provisioner())
            .await
            .unwrap();
        assert_eq!(validation.violations().len(), 1);
        assert!(validation.violations()[0].contains("structs"));
    }

    #[tokio::test]
    async fn every_bad_plugin_token_is_reported() {
        let jenkins = jenkins(
            "jenkins/jenkins:lts",
            &[("job-dsl", &["structs"]), ("bad name:1.0", &[])],
        );
        let validation = validate_base(&jenkins, &accepting_provisioner())
            .await
            .unwrap();
        assert_eq!(validation.violations().len(), 3);
    }

    #[tokio::test]
    async fn provisioner_verdict_is_anded() {
        let jenkins = jenkins("jenkins/jenkins:lts", &[]);
        let mut provisioner = MockBaseProvisioner::new();
        provisioner.expect_validate().times(1).returning(|_| Ok(false));

        let validation = validate_base(&jenkins, &provisioner).await.unwrap();
        assert_eq!(validation.violations(), ["rejected by base provisioner"]);
    }

    #[tokio::test]
    async fn provisioner_failure_is_an_error() {
        let jenkins = jenkins("jenkins/jenkins:lts", &[]);
        let mut provisioner = MockBaseProvisioner::new();
        provisioner.expect_validate().returning(|j| {
            Err(Error::collaborator(
                "base-provisioner",
                "validate",
                j.identity(),
                "timeout",
            ))
        });

        assert!(validate_base(&jenkins, &provisioner).await.is_err());
    }

    #[tokio::test]
    async fn validation_is_repeatable() {
        let jenkins = jenkins("jenkins/jenkins:lts", &[("job-dsl:1.70", &["structs:1.14"])]);
        let provisioner = accepting_provisioner();
        let first = validate_base(&jenkins, &provisioner).await.unwrap();
        let second = validate_base(&jenkins, &provisioner).await.unwrap();
        assert_eq!(first, second);
    }
}
