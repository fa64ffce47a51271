//! Broker 地址解析（`mqtt://host[:port]` / `mqtts://host[:port]`）。

use std::fmt;

use crate::PublishError;

/// 传输方式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrokerScheme {
    Tcp,
    Tls,
}

impl BrokerScheme {
    pub fn default_port(&self) -> u16 {
        match self {
            BrokerScheme::Tcp => 1883,
            BrokerScheme::Tls => 8883,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            BrokerScheme::Tcp => "mqtt",
            BrokerScheme::Tls => "mqtts",
        }
    }
}

/// 解析后的 Broker 地址。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerEndpoint {
    pub scheme: BrokerScheme,
    pub host: String,
    pub port: u16,
}

impl BrokerEndpoint {
    /// 解析 URL；`port_override` 优先于 URL 端口，其次为协议默认端口。
    pub fn parse(url: &str, port_override: Option<u16>) -> Result<Self, PublishError> {
        let url = url.trim();
        let (scheme, rest) = match url.split_once("://") {
            Some((scheme, rest)) => {
                let scheme = match scheme.to_ascii_lowercase().as_str() {
                    "mqtt" | "tcp" => BrokerScheme::Tcp,
                    "mqtts" | "ssl" | "tls" => BrokerScheme::Tls,
                    other => {
                        return Err(PublishError::Endpoint(format!(
                            "unsupported scheme: {}",
                            other
                        )));
                    }
                };
                (scheme, rest)
            }
            None => (BrokerScheme::Tcp, url),
        };
        let authority = rest.split('/').next().unwrap_or_default();
        if authority.contains('@') {
            return Err(PublishError::Endpoint(
                "credentials in url are not supported".to_string(),
            ));
        }

        let (host, url_port) = split_host_port(authority)?;
        if host.is_empty() {
            return Err(PublishError::Endpoint(format!("missing host: {}", url)));
        }
        let port = port_override
            .or(url_port)
            .unwrap_or_else(|| scheme.default_port());
        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for BrokerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", self.scheme.as_str(), self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.scheme.as_str(), self.host, self.port)
        }
    }
}

fn split_host_port(authority: &str) -> Result<(&str, Option<u16>), PublishError> {
    // IPv6 字面量：[::1]:1883
    if let Some(rest) = authority.strip_prefix('[') {
        let (host, tail) = rest
            .split_once(']')
            .ok_or_else(|| PublishError::Endpoint(format!("unterminated ipv6 host: {}", authority)))?;
        let port = match tail.strip_prefix(':') {
            Some(port) => Some(parse_port(port)?),
            None => None,
        };
        return Ok((host, port));
    }
    match authority.rsplit_once(':') {
        Some((host, port)) => Ok((host, Some(parse_port(port)?))),
        None => Ok((authority, None)),
    }
}

fn parse_port(value: &str) -> Result<u16, PublishError> {
    value
        .parse::<u16>()
        .map_err(|_| PublishError::Endpoint(format!("invalid port: {}", value)))
}
