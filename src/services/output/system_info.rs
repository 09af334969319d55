//! 文本报告头部使用的主机信息
//!
//! 操作系统版本、登录用户名、主机名来自 whoami；
//! MAC地址在Linux下读取 /sys/class/net，其他平台优雅降级为None。

use once_cell::sync::Lazy;

/// 操作系统版本描述，例如 "Ubuntu 22.04.3 LTS"
pub fn os_version() -> String {
    whoami::distro()
}

/// 当前登录用户名
pub fn login_user() -> String {
    whoami::username()
}

/// 主机名；取不到时为 "unknown"
pub fn hostname() -> String {
    whoami::fallible::hostname().unwrap_or_else(|_| "unknown".to_string())
}

/// 首个非回环网卡的MAC地址，格式 "AA-BB-CC-DD-EE-FF"
pub fn mac_address() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let entries = std::fs::read_dir("/sys/class/net").ok()?;
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|name| name != "lo")
            .collect();
        names.sort();

        for name in names {
            let path = format!("/sys/class/net/{}/address", name);
            if let Ok(raw) = std::fs::read_to_string(path) {
                let mac = raw.trim();
                if !mac.is_empty() && mac != "00:00:00:00:00:00" {
                    return Some(mac.to_uppercase().replace(':', "-"));
                }
            }
        }
        None
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// 机架号及穴位号标签：主机名_MAC；无MAC时仅主机名
pub static STATION_LABEL: Lazy<String> = Lazy::new(|| match mac_address() {
    Some(mac) => format!("{}_{}", hostname(), mac),
    None => hostname(),
});

/// 机架号及穴位号标签的便捷访问
pub fn station_label() -> &'static str {
    &STATION_LABEL
}
