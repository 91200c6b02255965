use std::fmt;

use crate::constants::*;
use crate::models::Pod;

/// Diagnostic profile selected by the `--resource` option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkloadType {
    /// No operator-specific collection
    Generic,
    /// Percona XtraDB Cluster
    Pxc,
    /// Percona Server for MySQL
    Ps,
    /// Percona Server for MongoDB
    Psmdb,
    /// Percona Operator for PostgreSQL v1
    Pg,
    /// Percona Operator for PostgreSQL v2
    PgV2,
}

/// How a pod is recognised as belonging to the workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PodMatch {
    Never,
    /// `app.kubernetes.io/component` equals the value
    Component(&'static str),
    /// The label equals the value
    LabelEquals(&'static str, &'static str),
    /// Every listed label is present and non-empty
    LabelsPresent(&'static [&'static str]),
}

/// Where the summary step finds database credentials
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStrategy {
    None,
    /// Root password from the cluster secret (MySQL family)
    RootPassword,
    /// Admin user and password from the users secret (MongoDB family)
    AdminUser,
}

/// Which external diagnostic the summary step runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryStrategy {
    None,
    MysqlSummary,
    MongodbSummary,
    /// pg_gather piped through `kubectl exec`
    PgGather,
}

/// Everything that varies per workload type, in one row
#[derive(Debug)]
pub struct WorkloadProfile {
    pub workload: WorkloadType,
    /// Admin-facing selector and custom resource short name
    pub name: &'static str,
    pub extra_resources: &'static [&'static str],
    pub file_paths: &'static [&'static str],
    pub file_container: Option<&'static str>,
    pub pod_match: PodMatch,
    /// Pod label naming the owning custom resource
    pub cr_name_label: &'static str,
    pub credentials: CredentialStrategy,
    pub summary: SummaryStrategy,
    pub remote_port: Option<u16>,
}

static PROFILES: [WorkloadProfile; 6] = [
    WorkloadProfile {
        workload: WorkloadType::Generic,
        name: NONE_SELECTOR,
        extra_resources: &[],
        file_paths: &[],
        file_container: None,
        pod_match: PodMatch::Never,
        cr_name_label: LABEL_INSTANCE,
        credentials: CredentialStrategy::None,
        summary: SummaryStrategy::None,
        remote_port: None,
    },
    WorkloadProfile {
        workload: WorkloadType::Pxc,
        name: "pxc",
        extra_resources: PXC_RESOURCES,
        file_paths: PXC_FILE_PATHS,
        file_container: Some(PXC_FILE_CONTAINER),
        pod_match: PodMatch::Component("pxc"),
        cr_name_label: LABEL_INSTANCE,
        credentials: CredentialStrategy::RootPassword,
        summary: SummaryStrategy::MysqlSummary,
        remote_port: Some(MYSQL_PORT),
    },
    WorkloadProfile {
        workload: WorkloadType::Ps,
        name: "ps",
        extra_resources: PS_RESOURCES,
        file_paths: &[],
        file_container: None,
        pod_match: PodMatch::Component("mysql"),
        cr_name_label: LABEL_INSTANCE,
        credentials: CredentialStrategy::RootPassword,
        summary: SummaryStrategy::MysqlSummary,
        remote_port: Some(MYSQL_PORT),
    },
    WorkloadProfile {
        workload: WorkloadType::Psmdb,
        name: "psmdb",
        extra_resources: PSMDB_RESOURCES,
        file_paths: &[],
        file_container: None,
        pod_match: PodMatch::Component("mongod"),
        cr_name_label: LABEL_INSTANCE,
        credentials: CredentialStrategy::AdminUser,
        summary: SummaryStrategy::MongodbSummary,
        remote_port: Some(MONGODB_PORT),
    },
    WorkloadProfile {
        workload: WorkloadType::Pg,
        name: "pg",
        extra_resources: PG_RESOURCES,
        file_paths: &[],
        file_container: None,
        pod_match: PodMatch::LabelEquals(LABEL_PG_DATABASE, "true"),
        cr_name_label: LABEL_PG_CLUSTER,
        credentials: CredentialStrategy::None,
        summary: SummaryStrategy::PgGather,
        remote_port: Some(POSTGRESQL_PORT),
    },
    WorkloadProfile {
        workload: WorkloadType::PgV2,
        name: "pgv2",
        extra_resources: PGV2_RESOURCES,
        file_paths: &[],
        file_container: None,
        pod_match: PodMatch::LabelsPresent(&[LABEL_PGV2_VERSION, LABEL_PGV2_INSTANCE]),
        cr_name_label: LABEL_PGV2_CLUSTER,
        credentials: CredentialStrategy::None,
        summary: SummaryStrategy::PgGather,
        remote_port: Some(POSTGRESQL_PORT),
    },
];

impl WorkloadType {
    /// Derive the type from a selector: exact name or `name/<cluster>` prefix.
    /// Anything unrecognised (including `none`) is `Generic`.
    pub fn from_selector(selector: &str) -> Self {
        let kind = selector.split_once('/').map_or(selector, |(kind, _)| kind);
        PROFILES
            .iter()
            .skip(1)
            .find(|profile| profile.name == kind)
            .map_or(WorkloadType::Generic, |profile| profile.workload)
    }

    pub fn profile(self) -> &'static WorkloadProfile {
        let index = match self {
            WorkloadType::Generic => 0,
            WorkloadType::Pxc => 1,
            WorkloadType::Ps => 2,
            WorkloadType::Psmdb => 3,
            WorkloadType::Pg => 4,
            WorkloadType::PgV2 => 5,
        };
        &PROFILES[index]
    }

    /// Whether the pod runs this workload's database
    pub fn matches_pod(self, pod: &Pod) -> bool {
        match self.profile().pod_match {
            PodMatch::Never => false,
            PodMatch::Component(component) => pod.label(LABEL_COMPONENT) == Some(component),
            PodMatch::LabelEquals(key, value) => pod.label(key) == Some(value),
            PodMatch::LabelsPresent(keys) => keys.iter().all(|key| pod.label(key).is_some()),
        }
    }

    /// Name of the custom resource that owns the pod
    pub fn cr_name<'p>(self, pod: &'p Pod) -> Option<&'p str> {
        pod.label(self.profile().cr_name_label)
    }

    pub fn name(self) -> &'static str {
        self.profile().name
    }
}

impl fmt::Display for WorkloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
