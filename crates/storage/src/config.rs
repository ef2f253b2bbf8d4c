use std::path::PathBuf;

/// Which backend stores generated covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageDriver {
    Local,
    S3,
    /// Cloudflare R2 through its S3-compatible endpoint.
    R2,
}

impl StorageDriver {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "local" => Some(Self::Local),
            "s3" => Some(Self::S3),
            "r2" => Some(Self::R2),
            _ => None,
        }
    }
}

/// Storage configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub driver: StorageDriver,
    /// Root directory for the local driver.
    pub local_dir: PathBuf,
    /// Prefix for public object URLs. Defaults to the API's storage proxy.
    pub public_base_url: String,
    pub bucket: Option<String>,
    pub region: String,
    /// Custom S3 endpoint (required for R2 unless `R2_ACCOUNT_ID` is set).
    pub endpoint: Option<String>,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

impl StorageConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                         |
    /// |---------------------------|---------------------------------|
    /// | `STORAGE_DRIVER`          | `local` (`local`, `s3`, `r2`)   |
    /// | `STORAGE_LOCAL_DIR`       | `./data/storage`                |
    /// | `STORAGE_PUBLIC_BASE_URL` | `/api/storage`                  |
    /// | `S3_BUCKET`               | --                              |
    /// | `S3_REGION`               | `us-east-1` (`auto` for R2)     |
    /// | `S3_ENDPOINT`             | --                              |
    /// | `R2_ACCOUNT_ID`           | --                              |
    /// | `S3_ACCESS_KEY_ID`        | --                              |
    /// | `S3_SECRET_ACCESS_KEY`    | --                              |
    ///
    /// # Panics
    ///
    /// Panics if `STORAGE_DRIVER` is unknown, or if an S3/R2 driver is
    /// selected without `S3_BUCKET`.
    pub fn from_env() -> Self {
        let driver_name = std::env::var("STORAGE_DRIVER").unwrap_or_else(|_| "local".into());
        let driver = StorageDriver::from_name(&driver_name)
            .unwrap_or_else(|| panic!("STORAGE_DRIVER must be local, s3 or r2, got '{driver_name}'"));

        let bucket = non_empty_var("S3_BUCKET");
        if driver != StorageDriver::Local {
            assert!(bucket.is_some(), "S3_BUCKET must be set for the {driver_name} driver");
        }

        let region = non_empty_var("S3_REGION").unwrap_or_else(|| match driver {
            StorageDriver::R2 => "auto".into(),
            _ => "us-east-1".into(),
        });

        let endpoint = non_empty_var("S3_ENDPOINT").or_else(|| {
            if driver == StorageDriver::R2 {
                non_empty_var("R2_ACCOUNT_ID")
                    .map(|account| format!("https://{account}.r2.cloudflarestorage.com"))
            } else {
                None
            }
        });

        Self {
            driver,
            local_dir: std::env::var("STORAGE_LOCAL_DIR")
                .unwrap_or_else(|_| "./data/storage".into())
                .into(),
            public_base_url: std::env::var("STORAGE_PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "/api/storage".into()),
            bucket,
            region,
            endpoint,
            access_key_id: non_empty_var("S3_ACCESS_KEY_ID"),
            secret_access_key: non_empty_var("S3_SECRET_ACCESS_KEY"),
        }
    }

    /// Local-driver configuration rooted at `dir`.
    pub fn local(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            driver: StorageDriver::Local,
            local_dir: dir.into(),
            public_base_url: public_base_url.into(),
            bucket: None,
            region: "us-east-1".into(),
            endpoint: None,
            access_key_id: None,
            secret_access_key: None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_names() {
        assert_eq!(StorageDriver::from_name("LOCAL"), Some(StorageDriver::Local));
        assert_eq!(StorageDriver::from_name("r2"), Some(StorageDriver::R2));
        assert_eq!(StorageDriver::from_name("gcs"), None);
    }
}
