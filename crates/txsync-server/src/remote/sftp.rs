//! SFTP client for the remote log store
//!
//! Wraps a blocking `ssh2` session behind `tokio::task::spawn_blocking`.
//! Authentication is public-key only; the host key is checked against
//! `~/.ssh/known_hosts` unless verification is explicitly disabled in
//! configuration.

use ssh2::{CheckResult, KnownHostFileKind, Session, Sftp};
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::SftpConfig;
use crate::error::{SyncError, SyncResult};
use crate::remote::RemoteStore;

/// A directory entry on the remote store.
#[derive(Debug, Clone)]
pub struct RemoteEntry {
    pub name: String,
    pub is_dir: bool,
    pub is_file: bool,
}

impl RemoteEntry {
    /// Hidden entries (dotfiles) are never treated as clients or log files.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }
}

/// Join a remote path and a child name with `/`.
pub fn remote_join(base: &str, name: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), name)
}

/// Connected SFTP client, cheap to clone.
///
/// `ssh2::Session` and `ssh2::Sftp` are internally synchronized, so clones
/// share one underlying session. Dropping the last clone closes it.
#[derive(Clone)]
pub struct SftpClient {
    inner: Arc<SftpInner>,
}

struct SftpInner {
    // Held to keep the transport alive for the lifetime of the sftp channel.
    _session: Session,
    sftp: Sftp,
}

impl SftpClient {
    /// Open a session, verify the host key, and authenticate.
    pub async fn connect(config: &SftpConfig) -> SyncResult<Self> {
        let config = config.clone();
        tokio::task::spawn_blocking(move || Self::connect_sync(&config)).await?
    }

    fn connect_sync(config: &SftpConfig) -> SyncResult<Self> {
        debug!(host = %config.host, port = config.port, "Connecting to SFTP server");

        let addr = (config.host.as_str(), config.port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("no address resolved for {}", config.host),
                )
            })?;

        let tcp = TcpStream::connect_timeout(
            &addr,
            Duration::from_secs(config.connect_timeout_secs),
        )?;

        let mut session = Session::new()?;
        session.set_tcp_stream(tcp);
        session.handshake()?;

        if config.verify_host_key {
            Self::verify_host_key(&session, &config.host, config.port)?;
        } else {
            warn!(host = %config.host, "Skipping host key verification");
        }

        debug!(username = %config.username, "Authenticating with private key");
        session.userauth_pubkey_file(&config.username, None, &config.private_key_path, None)?;

        let sftp = session.sftp()?;

        Ok(Self {
            inner: Arc::new(SftpInner {
                _session: session,
                sftp,
            }),
        })
    }

    fn verify_host_key(session: &Session, host: &str, port: u16) -> SyncResult<()> {
        let (key, _key_type) = session
            .host_key()
            .ok_or_else(|| SyncError::HostKeyVerification {
                host: host.to_string(),
            })?;

        let mut known_hosts = session.known_hosts()?;
        let known_hosts_path = dirs::home_dir()
            .map(|home| home.join(".ssh").join("known_hosts"))
            .ok_or_else(|| SyncError::HostKeyVerification {
                host: host.to_string(),
            })?;
        known_hosts.read_file(&known_hosts_path, KnownHostFileKind::OpenSSH)?;

        match known_hosts.check_port(host, port.into(), key) {
            CheckResult::Match => Ok(()),
            _ => {
                warn!(host = %host, "Host key check did not match known_hosts");
                Err(SyncError::HostKeyVerification {
                    host: host.to_string(),
                })
            },
        }
    }
}

impl RemoteStore for SftpClient {
    /// List a remote directory.
    async fn read_dir(&self, path: &str) -> SyncResult<Vec<RemoteEntry>> {
        let inner = self.inner.clone();
        let path = PathBuf::from(path);

        tokio::task::spawn_blocking(move || {
            let entries = inner.sftp.readdir(&path)?;
            Ok(entries
                .into_iter()
                .filter_map(|(entry_path, stat)| {
                    let name = entry_path.file_name()?.to_str()?.to_string();
                    Some(RemoteEntry {
                        name,
                        is_dir: stat.is_dir(),
                        is_file: stat.is_file(),
                    })
                })
                .collect())
        })
        .await?
    }

    /// Download a remote file to a local path, returning the byte count.
    async fn download(&self, remote_path: &str, local_path: &Path) -> SyncResult<u64> {
        let inner = self.inner.clone();
        let remote_path = PathBuf::from(remote_path);
        let local_path = local_path.to_path_buf();

        tokio::task::spawn_blocking(move || {
            let mut remote_file = inner.sftp.open(&remote_path)?;
            let mut local_file = std::fs::File::create(&local_path)?;

            let mut buf = [0u8; 32 * 1024];
            let mut total = 0u64;
            loop {
                let n = remote_file.read(&mut buf)?;
                if n == 0 {
                    break;
                }
                local_file.write_all(&buf[..n])?;
                total += n as u64;
            }
            local_file.flush()?;

            debug!(remote = %remote_path.display(), bytes = total, "Downloaded remote file");
            Ok(total)
        })
        .await?
    }

    /// Rename a remote file, used to move committed files into the archive.
    async fn rename(&self, from: &str, to: &str) -> SyncResult<()> {
        let inner = self.inner.clone();
        let from = PathBuf::from(from);
        let to = PathBuf::from(to);

        tokio::task::spawn_blocking(move || {
            inner.sftp.rename(&from, &to, None)?;
            Ok(())
        })
        .await?
    }

    /// Idempotently create a remote directory, including missing parents.
    async fn ensure_dir(&self, path: &str) -> SyncResult<()> {
        let inner = self.inner.clone();
        let path = path.to_string();

        tokio::task::spawn_blocking(move || {
            let mut current = String::new();
            for component in path.split('/').filter(|c| !c.is_empty()) {
                current.push('/');
                current.push_str(component);
                let dir = PathBuf::from(&current);
                if inner.sftp.stat(&dir).is_err() {
                    inner.sftp.mkdir(&dir, 0o755)?;
                }
            }
            Ok(())
        })
        .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_join() {
        assert_eq!(remote_join("/logs", "client1"), "/logs/client1");
        assert_eq!(remote_join("/logs/", "client1"), "/logs/client1");
        assert_eq!(remote_join("/", "clients"), "/clients");
    }

    #[test]
    fn test_hidden_entries() {
        let hidden = RemoteEntry {
            name: ".DS_Store".to_string(),
            is_dir: false,
            is_file: true,
        };
        let visible = RemoteEntry {
            name: "log1.csv".to_string(),
            is_dir: false,
            is_file: true,
        };
        assert!(hidden.is_hidden());
        assert!(!visible.is_hidden());
    }
}
