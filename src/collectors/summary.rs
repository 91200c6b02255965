use std::ffi::OsString;

use anyhow::{anyhow, Context, Result};
use log::{debug, info};

use crate::collectors::error_ledger::ErrorLedger;
use crate::collectors::kubectl::{args, Kubectl};
use crate::collectors::tunnel::{self, PortForward};
use crate::config::{CollectionConfig, CredentialStrategy, SummaryStrategy};
use crate::constants::{
    DEFAULT_SECRETS_SUFFIX, MONGODB_AUTH_DATABASE, MONGODB_PASSWORD_FIELD, MONGODB_SUMMARY_TOOL,
    MONGODB_USER_FIELD, MYSQL_PASSWORD_FIELD, MYSQL_ROOT_USER, MYSQL_SUMMARY_TOOL, PG_GATHER_URL,
    SHELL, TUNNEL_HOST,
};
use crate::models::CredentialReference;
use crate::utils::process::StderrPolicy;

/// Database credentials resolved from the workload's secrets.
///
/// Values are the decoded secret bytes; they are not required to be UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    None,
    Password(Vec<u8>),
    UserPassword { user: Vec<u8>, password: Vec<u8> },
}

/// Runs the workload's diagnostic tool against one database pod
pub struct SummaryGenerator<'a> {
    config: &'a CollectionConfig,
    kubectl: &'a Kubectl,
}

impl<'a> SummaryGenerator<'a> {
    pub fn new(config: &'a CollectionConfig, kubectl: &'a Kubectl) -> Self {
        Self { config, kubectl }
    }

    /// Produce the diagnostic report for `pod`.
    ///
    /// Credentials are resolved first, then a port-forward to the pod is
    /// opened for the duration of the tool run. The tunnel is torn down on
    /// every path out of this function; tunnel faults go to `ledger`.
    pub fn generate(
        &self,
        pod: &str,
        cr_name: &str,
        namespace: &str,
        ledger: &mut ErrorLedger,
    ) -> Result<Vec<u8>> {
        let profile = self.config.workload.profile();
        if profile.summary == SummaryStrategy::None {
            return Err(anyhow!("no summary tool for workload type {}", self.config.workload));
        }

        let credentials = self.resolve_credentials(cr_name, namespace)?;

        let remote_port = tunnel::remote_port(profile.remote_port)?;
        let local_port = tunnel::local_port(self.config.forward_port, remote_port);
        let tunnel = PortForward::open(self.kubectl, pod, namespace, local_port, remote_port)
            .context("start port-forward")?;
        tunnel.wait_until_ready(self.config.tunnel_timeout);

        let result = self
            .tool_invocation(pod, namespace, local_port, &credentials)
            .and_then(|(program, tool_args)| {
                info!("Running {} for pod {}/{}", program, namespace, pod);
                self.kubectl
                    .runner()
                    .run_os(&program, &tool_args, StderrPolicy::ExitStatusOnly)
                    .map_err(anyhow::Error::from)
            });

        tunnel.close(ledger);
        result
    }

    fn resolve_credentials(&self, cr_name: &str, namespace: &str) -> Result<Credentials> {
        let profile = self.config.workload.profile();
        match profile.credentials {
            CredentialStrategy::None => Ok(Credentials::None),
            CredentialStrategy::RootPassword => {
                let cr = self.get_cr(profile.name, cr_name, namespace).context("get cr")?;
                let secret = cr
                    .mysql_secret()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}{}", cr_name, DEFAULT_SECRETS_SUFFIX));
                debug!("Using secret {} for {} credentials", secret, cr_name);

                let password = self
                    .kubectl
                    .secret_field(&secret, MYSQL_PASSWORD_FIELD, namespace)
                    .with_context(|| format!("get password from {} users secret", profile.name))?;
                Ok(Credentials::Password(password))
            }
            CredentialStrategy::AdminUser => {
                let cr = self.get_cr(profile.name, cr_name, namespace).context("get cr")?;
                let secret = cr
                    .mongodb_users_secret()
                    .ok_or_else(|| anyhow!("{}/{} has no spec.secrets.users", profile.name, cr_name))?
                    .to_string();

                let user = self
                    .kubectl
                    .secret_field(&secret, MONGODB_USER_FIELD, namespace)
                    .with_context(|| format!("get user name from {} users secret", profile.name))?;
                let password = self
                    .kubectl
                    .secret_field(&secret, MONGODB_PASSWORD_FIELD, namespace)
                    .with_context(|| format!("get password from {} users secret", profile.name))?;
                Ok(Credentials::UserPassword { user, password })
            }
        }
    }

    fn get_cr(&self, kind: &str, cr_name: &str, namespace: &str) -> Result<CredentialReference> {
        let resource = format!("{}/{}", kind, cr_name);
        let output = self
            .kubectl
            .run(&args(&["get", &resource, "-o", "json", "-n", namespace]))
            .with_context(|| format!("get {}", resource))?;

        serde_json::from_slice(&output).with_context(|| format!("unmarshal {} cr", resource))
    }

    fn tool_invocation(
        &self,
        pod: &str,
        namespace: &str,
        local_port: u16,
        credentials: &Credentials,
    ) -> Result<(String, Vec<OsString>)> {
        let no_secret = Vec::new();
        match self.config.workload.profile().summary {
            SummaryStrategy::MysqlSummary => {
                let password = match credentials {
                    Credentials::Password(password) => password,
                    _ => &no_secret,
                };
                Ok((
                    MYSQL_SUMMARY_TOOL.to_string(),
                    vec![
                        OsString::from(format!("--host={}", TUNNEL_HOST)),
                        OsString::from(format!("--port={}", local_port)),
                        OsString::from(format!("--user={}", MYSQL_ROOT_USER)),
                        secret_arg("--password=", password)?,
                    ],
                ))
            }
            SummaryStrategy::MongodbSummary => {
                let (user, password) = match credentials {
                    Credentials::UserPassword { user, password } => (user, password),
                    _ => (&no_secret, &no_secret),
                };
                Ok((
                    MONGODB_SUMMARY_TOOL.to_string(),
                    vec![
                        secret_arg("--username=", user)?,
                        secret_arg("--password=", password)?,
                        OsString::from(format!("--authenticationDatabase={}", MONGODB_AUTH_DATABASE)),
                        OsString::from(format!("{}:{}", TUNNEL_HOST, local_port)),
                    ],
                ))
            }
            SummaryStrategy::PgGather | SummaryStrategy::None => Ok((
                SHELL.to_string(),
                vec![
                    OsString::from("-c"),
                    OsString::from(self.pg_gather_pipeline(pod, namespace)),
                ],
            )),
        }
    }

    /// Shell pipeline feeding pg_gather into `psql` inside the pod
    fn pg_gather_pipeline(&self, pod: &str, namespace: &str) -> String {
        let kubeconfig = match self.kubectl.kubeconfig() {
            "" => String::new(),
            path => format!(" --kubeconfig={}", path),
        };
        format!(
            "curl {} 2>/dev/null | {}{} -n {} exec -i {} -- psql -X -f - ",
            PG_GATHER_URL,
            self.kubectl.command(),
            kubeconfig,
            namespace,
            pod
        )
    }
}

/// `<flag><value>` with the secret bytes passed through unchanged
#[cfg(unix)]
fn secret_arg(flag: &str, value: &[u8]) -> Result<OsString> {
    use std::os::unix::ffi::OsStringExt;

    let mut arg = flag.as_bytes().to_vec();
    arg.extend_from_slice(value);
    Ok(OsString::from_vec(arg))
}

#[cfg(not(unix))]
fn secret_arg(flag: &str, value: &[u8]) -> Result<OsString> {
    let value = std::str::from_utf8(value)
        .with_context(|| format!("{} value is not valid UTF-8", flag.trim_end_matches('=')))?;
    Ok(OsString::from(format!("{}{}", flag, value)))
}
