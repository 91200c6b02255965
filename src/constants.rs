//! Global constants for the k8s-debug-collector application.
//!
//! This module centralizes all hardcoded values (resource kinds, label keys,
//! ports, external tool names) to keep the collectors free of magic strings.

use std::time::Duration;

// Cluster CLI defaults
/// Cluster control-plane CLI invoked for every cluster call
pub const DEFAULT_KUBECTL_COMMAND: &str = "kubectl";

/// Archive root directory name (the output file is `<root>.tar.gz`)
pub const DEFAULT_ARCHIVE_ROOT: &str = "cluster-dump";

/// Extension appended to the archive root to name the output file
pub const ARCHIVE_EXTENSION: &str = ".tar.gz";

/// Permission bits written into every archive entry header
pub const DEFAULT_ENTRY_MODE: u32 = 0o777;

/// Workload selector that triggers API-resource discovery
pub const AUTO_SELECTOR: &str = "auto";

/// Effective selector when discovery finds no workload resources
pub const NONE_SELECTOR: &str = "none";

// Archive entry names
pub const ERRORS_FILE_NAME: &str = "errors.txt";
pub const LOGS_FILE_NAME: &str = "logs.txt";
pub const SUMMARY_FILE_NAME: &str = "summary.txt";
pub const NODES_RESOURCE: &str = "nodes";

/// Resource kinds collected in every namespace regardless of workload type
pub const BASE_RESOURCES: &[&str] = &[
    "pods",
    "replicasets",
    "deployments",
    "statefulsets",
    "replicationcontrollers",
    "events",
    "configmaps",
    "cronjobs",
    "jobs",
    "poddisruptionbudgets",
    "clusterrolebindings",
    "clusterroles",
    "rolebindings",
    "roles",
    "storageclasses",
    "persistentvolumeclaims",
    "persistentvolumes",
];

// Workload-specific resource kinds
pub const PXC_RESOURCES: &[&str] = &[
    "perconaxtradbclusterbackups",
    "perconaxtradbclusterrestores",
    "perconaxtradbclusters",
];

pub const PS_RESOURCES: &[&str] = &[
    "perconaservermysqlbackups",
    "perconaservermysqlrestores",
    "perconaservermysqls",
];

pub const PSMDB_RESOURCES: &[&str] = &[
    "perconaservermongodbbackups",
    "perconaservermongodbrestores",
    "perconaservermongodbs",
];

pub const PG_RESOURCES: &[&str] = &[
    "perconapgclusters",
    "pgclusters",
    "pgpolicies",
    "pgreplicas",
    "pgtasks",
];

pub const PGV2_RESOURCES: &[&str] = &[
    "perconapgbackups",
    "perconapgclusters",
    "perconapgrestores",
];

/// Files copied out of PXC pods (relative to the container root)
pub const PXC_FILE_PATHS: &[&str] = &[
    "var/lib/mysql/mysqld-error.log",
    "var/lib/mysql/innobackup.backup.log",
    "var/lib/mysql/innobackup.move.log",
    "var/lib/mysql/innobackup.prepare.log",
    "var/lib/mysql/grastate.dat",
    "var/lib/mysql/gvwstate.dat",
    "var/lib/mysql/mysqld.post.processing.log",
    "var/lib/mysql/auto.cnf",
];

/// Container inside PXC pods that exposes the MySQL data directory
pub const PXC_FILE_CONTAINER: &str = "logs";

// Pod label keys
pub const LABEL_INSTANCE: &str = "app.kubernetes.io/instance";
pub const LABEL_COMPONENT: &str = "app.kubernetes.io/component";
pub const LABEL_PG_DATABASE: &str = "pgo-pg-database";
pub const LABEL_PG_CLUSTER: &str = "pg-cluster";
pub const LABEL_PGV2_VERSION: &str = "pgv2.percona.com/version";
pub const LABEL_PGV2_INSTANCE: &str = "postgres-operator.crunchydata.com/instance";
pub const LABEL_PGV2_CLUSTER: &str = "postgres-operator.crunchydata.com/cluster";

// Protocol ports
pub const MYSQL_PORT: u16 = 3306;
pub const MONGODB_PORT: u16 = 27017;
pub const POSTGRESQL_PORT: u16 = 5432;

// Tunnel timing
/// Upper bound on waiting for a port-forward to accept connections
pub const TUNNEL_READY_TIMEOUT: Duration = Duration::from_secs(3);

/// Interval between readiness probes of the local tunnel port
pub const TUNNEL_PROBE_INTERVAL: Duration = Duration::from_millis(100);

/// Connect timeout for a single readiness probe
pub const TUNNEL_CONNECT_TIMEOUT: Duration = Duration::from_millis(200);

/// Loopback address the tunnel listens on
pub const TUNNEL_HOST: &str = "127.0.0.1";

// Summary tools and credentials
pub const MYSQL_SUMMARY_TOOL: &str = "pt-mysql-summary";
pub const MONGODB_SUMMARY_TOOL: &str = "pt-mongodb-summary";
pub const SHELL: &str = "sh";
pub const PG_GATHER_URL: &str =
    "https://raw.githubusercontent.com/percona/support-snippets/master/postgresql/pg_gather/gather.sql";

pub const MYSQL_ROOT_USER: &str = "root";
pub const MYSQL_PASSWORD_FIELD: &str = "root";
pub const MONGODB_USER_FIELD: &str = "MONGODB_DATABASE_ADMIN_USER";
pub const MONGODB_PASSWORD_FIELD: &str = "MONGODB_DATABASE_ADMIN_PASSWORD";
pub const MONGODB_AUTH_DATABASE: &str = "admin";

/// Suffix of the default secret holding MySQL-family credentials
pub const DEFAULT_SECRETS_SUFFIX: &str = "-secrets";
