//! Well-known names in the automation system
//!
//! Environment variable names, mounted paths, secret keys and the reserved
//! result-detail keys understood by the result store.

// Environment variables
pub const ENV_POD_NAME: &str = "ENV_POD_NAME";
pub const ENV_JOB_NAME: &str = "ENV_JOB_NAME";
pub const ENV_INTERNAL_COMMUNICATION_KEY: &str = "A01_INTERNAL_COMKEY";
pub const ENV_TASK_BROKER_URL: &str = "A01_TASKBROKER_URL";
pub const ENV_STORE_URL: &str = "A01_STORE_URL";
pub const ENV_SECRETS_PATH: &str = "A01_SECRETS_PATH";
pub const ENV_ARTIFACTS_PATH: &str = "A01_ARTIFACTS_PATH";
pub const ENV_PREPARE_POD_SCRIPT: &str = "A01_PREPARE_POD_SCRIPT";
pub const ENV_AFTER_TASK_SCRIPT: &str = "A01_AFTER_TASK_SCRIPT";
pub const ENV_PROCESS_TIMEOUT: &str = "DROID_PROCESS_TIMEOUT";

// In-cluster services
pub const DNS_NAME_TASK_BROKER: &str = "a01-taskbroker-svc";
pub const DNS_NAME_TASK_STORE: &str = "data-store-svc";
pub const DNS_NAME_EMAIL_SERVICE: &str = "email-report-svc";
pub const DNS_NAME_REPORT_SERVICE: &str = "report-internal-svc";

// Mounted paths and scripts
pub const PATH_MOUNT_ARTIFACTS: &str = "/mnt/artifacts";
pub const PATH_MOUNT_SECRETS: &str = "/mnt/secrets";
pub const PATH_SCRIPT_PREPARE_POD: &str = "/app/prepare_pod";
pub const PATH_SCRIPT_AFTER_TASK: &str = "/app/after_test";

/// Product secret holding the log path template
pub const PRODUCT_SECRET_KEY_LOG_PATH_TEMPLATE: &str = "log.path.template";

/// Placeholder substituted in the log path template
pub const LOG_PATH_PLACEHOLDER: &str = "{}";

// Task result details
pub const KEY_AGENT: &str = "agent";
pub const KEY_ERROR: &str = "error";
pub const KEY_TASK_LOG_PATH: &str = "a01.reserved.tasklogpath";
pub const KEY_TASK_RECORD_PATH: &str = "a01.reserved.taskrecordpath";

// Run settings
pub const KEY_REMARK: &str = "a01.reserved.remark";
pub const KEY_USER_EMAIL: &str = "a01.reserved.useremail";
pub const REMARK_OFFICIAL: &str = "official";
