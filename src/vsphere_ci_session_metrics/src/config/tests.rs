#[cfg(test)]
mod tests {
    use crate::cli::StartArgs;
    use crate::config::{Config, ConfigLoader};
    use serial_test::serial;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn required_args() -> StartArgs {
        StartArgs {
            build_kubeconfig: Some(PathBuf::from("/etc/build/kubeconfig")),
            vsphere: Some("vcenter.ci.example.com".to_string()),
            vsphere_user: Some("exporter@vsphere.local".to_string()),
            vsphere_passwd: Some("hunter2".to_string()),
            ..Default::default()
        }
    }

    fn toml_file(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    #[serial]
    fn test_defaults() {
        let config = ConfigLoader::load(None, &required_args()).unwrap();
        assert_eq!(config.warning_threshold, 30.0);
        assert_eq!(config.listen_port, 8090);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.vsphere_user_agent, "vsphere-ci-session-metrics");
        assert!(!config.vsphere_insecure);
        assert_eq!(config.vsphere_domain, "vsphere.local");
        assert_eq!(config.prow, "prow.ci.openshift.org");
        assert_eq!(config.prow_cluster_alias, "vsphere");
        assert_eq!(config.login_timeout, 60);
        assert_eq!(config.prow_kubeconfig, None);
        assert_eq!(config.build_kubeconfig, PathBuf::from("/etc/build/kubeconfig"));
    }

    #[test]
    #[serial]
    fn test_missing_required_values() {
        assert!(ConfigLoader::load(None, &StartArgs::default()).is_err());
    }

    #[test]
    #[serial]
    fn test_flags_override_file() {
        let file = toml_file(
            r#"
listen_port = 9000
log_level = "debug"
prow_cluster_alias = "vsphere-2"
vsphere = "from-file.example.com"
"#,
        );
        let args = StartArgs {
            listen_port: Some(9200),
            ..required_args()
        };

        let config = ConfigLoader::load(file.path().to_str(), &args).unwrap();
        assert_eq!(config.listen_port, 9200);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.prow_cluster_alias, "vsphere-2");
        assert_eq!(config.vsphere, "vcenter.ci.example.com");
    }

    #[test]
    #[serial]
    fn test_environment_overrides_file() {
        let file = toml_file("listen_port = 9000\nwarning_threshold = 5.5\n");
        std::env::set_var("LISTEN_PORT", "9100");
        std::env::set_var("VSPHERE_INSECURE", "true");
        std::env::set_var("PROW_KUBECONFIG", "");

        let config = ConfigLoader::load(file.path().to_str(), &required_args());

        std::env::remove_var("LISTEN_PORT");
        std::env::remove_var("VSPHERE_INSECURE");
        std::env::remove_var("PROW_KUBECONFIG");

        let config = config.unwrap();
        assert_eq!(config.listen_port, 9100);
        assert_eq!(config.warning_threshold, 5.5);
        assert!(config.vsphere_insecure);
        assert_eq!(config.prow_kubeconfig, None);
    }

    #[test]
    #[serial]
    fn test_debug_redacts_password() {
        let config = ConfigLoader::load(None, &required_args()).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains("exporter@vsphere.local"));
    }

    fn valid_config(kubeconfig: &NamedTempFile) -> Config {
        let args = StartArgs {
            build_kubeconfig: Some(kubeconfig.path().to_path_buf()),
            vsphere: Some("localhost".to_string()),
            prow: Some("localhost".to_string()),
            ..required_args()
        };
        ConfigLoader::load(None, &args).unwrap()
    }

    #[tokio::test]
    #[serial]
    async fn test_validate_accepts_resolvable_config() {
        let kubeconfig = NamedTempFile::new().unwrap();
        valid_config(&kubeconfig).validate().await.unwrap();
    }

    #[tokio::test]
    #[serial]
    async fn test_validate_rejects_negative_threshold() {
        let kubeconfig = NamedTempFile::new().unwrap();
        let config = Config {
            warning_threshold: -1.0,
            ..valid_config(&kubeconfig)
        };
        assert!(config.validate().await.is_err());
    }

    #[tokio::test]
    #[serial]
    async fn test_validate_rejects_zero_login_timeout() {
        let kubeconfig = NamedTempFile::new().unwrap();
        let config = Config {
            login_timeout: 0,
            ..valid_config(&kubeconfig)
        };
        let err = config.validate().await.unwrap_err();
        assert!(err.to_string().contains("login timeout"));
    }

    #[tokio::test]
    #[serial]
    async fn test_validate_rejects_missing_kubeconfigs() {
        let kubeconfig = NamedTempFile::new().unwrap();

        let missing_build = Config {
            build_kubeconfig: PathBuf::from("/nonexistent/build/kubeconfig"),
            ..valid_config(&kubeconfig)
        };
        let err = missing_build.validate().await.unwrap_err();
        assert!(err.to_string().contains("build kubeconfig"));

        let missing_prow = Config {
            prow_kubeconfig: Some(PathBuf::from("/nonexistent/prow/kubeconfig")),
            ..valid_config(&kubeconfig)
        };
        let err = missing_prow.validate().await.unwrap_err();
        assert!(err.to_string().contains("prow kubeconfig"));
    }
}
