use crate::constants::network;
use crate::host::OsFamily;
use std::collections::{BTreeMap, HashSet};
use std::net::{IpAddr, Ipv4Addr};
use tracing::{debug, info, warn};

/// 网卡类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterfaceKind {
    Ethernet,
    Wireless,
    Loopback,
    Other,
}

/// 选择局域网地址所需的网卡信息
#[derive(Debug, Clone)]
pub struct InterfaceInfo {
    pub name: String,
    /// `if_addrs` 不提供适配器描述，所有平台上都与名称相同
    pub description: String,
    pub kind: InterfaceKind,
    pub is_up: bool,
    pub has_gateway: bool,
    pub addresses: Vec<IpAddr>,
}

impl InterfaceInfo {
    /// 名称或描述命中虚拟网卡关键字
    pub fn is_virtual(&self) -> bool {
        let name = self.name.to_lowercase();
        let description = self.description.to_lowercase();
        network::VIRTUAL_ADAPTER_MARKERS
            .iter()
            .any(|marker| name.contains(marker) || description.contains(marker))
    }

    fn is_candidate(&self) -> bool {
        self.is_up && self.kind != InterfaceKind::Loopback && !self.is_virtual()
    }

    fn first_ipv4(&self) -> Option<Ipv4Addr> {
        self.addresses.iter().find_map(|addr| match addr {
            IpAddr::V4(v4) if !v4.is_loopback() => Some(*v4),
            _ => None,
        })
    }
}

/// 从网卡列表中挑选局域网 IPv4 地址
///
/// 跳过未启用、回环和虚拟网卡；只接受有网关的以太网或无线网卡。
pub fn select_lan_ipv4(interfaces: &[InterfaceInfo]) -> Option<Ipv4Addr> {
    for iface in interfaces.iter().filter(|i| i.is_candidate()) {
        if !matches!(iface.kind, InterfaceKind::Ethernet | InterfaceKind::Wireless) {
            continue;
        }
        // 真实网络通常有网关，虚拟网络往往没有
        if !iface.has_gateway {
            continue;
        }
        if let Some(ip) = iface.first_ipv4() {
            info!(
                "找到本机局域网地址: {} (网卡 {}, {:?})",
                ip, iface.name, iface.kind
            );
            return Some(ip);
        }
    }
    None
}

/// 探测本机局域网地址，找不到时返回 "127.0.0.1"
///
/// 返回的回环地址表示"地址未知"，不能当作可用的局域网地址。
pub fn locate_lan_ipv4() -> String {
    info!("检测本机 IP 地址");
    match select_lan_ipv4(&enumerate_interfaces()) {
        Some(ip) => ip.to_string(),
        None => {
            warn!("未检测到局域网地址，回退到 {}", network::LOCALHOST_IPV4);
            network::LOCALHOST_IPV4.to_string()
        }
    }
}

/// 是否为回退地址
pub fn is_fallback_address(address: &str) -> bool {
    address == network::LOCALHOST_IPV4
}

/// 用户连接共享使用的地址
pub fn connection_url(address: &str, share_name: &str, os: OsFamily) -> String {
    match os {
        OsFamily::Windows => format!(r"\\{address}\{share_name}"),
        _ => format!("smb://{address}/{share_name}"),
    }
}

/// 枚举本机网卡
pub fn enumerate_interfaces() -> Vec<InterfaceInfo> {
    let addrs = match if_addrs::get_if_addrs() {
        Ok(addrs) => addrs,
        Err(e) => {
            warn!("枚举网卡失败: {}", e);
            return Vec::new();
        }
    };

    // 同一网卡可能有多个地址，按名称合并并保持稳定顺序
    let mut grouped: BTreeMap<String, (bool, Vec<IpAddr>)> = BTreeMap::new();
    for iface in addrs {
        let entry = grouped
            .entry(iface.name.clone())
            .or_insert((false, Vec::new()));
        entry.0 |= iface.is_loopback();
        entry.1.push(iface.ip());
    }

    let gateways = gateway_interfaces(&grouped);
    grouped
        .into_iter()
        .map(|(name, (is_loopback, addresses))| {
            let info = describe_interface(&name, is_loopback, &gateways, addresses);
            debug!(
                "网卡 {}: {:?}, up={}, gateway={}",
                info.name, info.kind, info.is_up, info.has_gateway
            );
            info
        })
        .collect()
}

#[cfg(target_os = "linux")]
fn gateway_interfaces(_grouped: &BTreeMap<String, (bool, Vec<IpAddr>)>) -> HashSet<String> {
    match std::fs::read_to_string("/proc/net/route") {
        Ok(content) => parse_route_gateways(&content),
        Err(e) => {
            warn!("读取 /proc/net/route 失败: {}", e);
            HashSet::new()
        }
    }
}

/// 非 Linux 平台：默认路由出口所在的网卡视为有网关
#[cfg(not(target_os = "linux"))]
fn gateway_interfaces(grouped: &BTreeMap<String, (bool, Vec<IpAddr>)>) -> HashSet<String> {
    let Some(routed) = default_route_ipv4() else {
        return HashSet::new();
    };
    grouped
        .iter()
        .filter(|(_, (_, addrs))| addrs.contains(&IpAddr::V4(routed)))
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(target_os = "linux")]
fn describe_interface(
    name: &str,
    is_loopback: bool,
    gateways: &HashSet<String>,
    addresses: Vec<IpAddr>,
) -> InterfaceInfo {
    let sys_dir = std::path::Path::new("/sys/class/net").join(name);
    let read = |file: &str| {
        std::fs::read_to_string(sys_dir.join(file))
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    // 部分驱动报告 "unknown"，有地址时按启用处理
    let operstate = read("operstate");
    let is_up = operstate == "up" || operstate == "unknown";

    let kind = if is_loopback {
        InterfaceKind::Loopback
    } else if sys_dir.join("wireless").exists() || sys_dir.join("phy80211").exists() {
        InterfaceKind::Wireless
    } else if read("type") == "1" {
        // ARPHRD_ETHER
        InterfaceKind::Ethernet
    } else {
        InterfaceKind::Other
    };

    InterfaceInfo {
        name: name.to_string(),
        description: name.to_string(),
        kind,
        is_up,
        has_gateway: gateways.contains(name),
        addresses,
    }
}

/// 非 Linux 平台拿不到网卡类型与运行状态，已配置地址的非回环网卡按以太网处理
#[cfg(not(target_os = "linux"))]
fn describe_interface(
    name: &str,
    is_loopback: bool,
    gateways: &HashSet<String>,
    addresses: Vec<IpAddr>,
) -> InterfaceInfo {
    InterfaceInfo {
        name: name.to_string(),
        description: name.to_string(),
        kind: if is_loopback {
            InterfaceKind::Loopback
        } else {
            InterfaceKind::Ethernet
        },
        is_up: true,
        has_gateway: gateways.contains(name),
        addresses,
    }
}

/// 通过 UDP connect 获取默认路由使用的本地地址（不会发送数据）
#[cfg_attr(target_os = "linux", allow(dead_code))]
fn default_route_ipv4() -> Option<Ipv4Addr> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect(network::ROUTE_TARGET_ADDR).ok()?;
    match socket.local_addr().ok()?.ip() {
        IpAddr::V4(v4) if !v4.is_unspecified() && !v4.is_loopback() => Some(v4),
        _ => None,
    }
}

/// 解析 /proc/net/route，返回存在非零网关路由的网卡名
pub fn parse_route_gateways(content: &str) -> HashSet<String> {
    content
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let iface = fields.next()?;
            let _destination = fields.next()?;
            let gateway = fields.next()?;
            (gateway != "00000000").then(|| iface.to_string())
        })
        .collect()
}
