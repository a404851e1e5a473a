//! Module registry: the closed set of supported report types.
//!
//! The module set is fixed and small, so there is no dynamic registration —
//! everything downstream (prompt template, model override, theme) dispatches
//! with a total `match`. Any identifier outside the set is rejected by
//! [`ReportModule::parse`] before the pipeline touches configuration or the
//! network.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the four supported report categories.
///
/// Wire identifiers (requests, config keys, JSON output) are the kebab-case
/// forms: `brand`, `market`, `store-activity`, `data-statistics`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportModule {
    /// 餐饮品牌定位分析报告
    Brand,
    /// 商圈调研分析报告（唯一支持截图分析的模块）
    Market,
    /// 美团外卖店铺活动方案
    StoreActivity,
    /// 外卖店铺数据统计分析报告
    DataStatistics,
}

impl ReportModule {
    /// Every supported module, in display order.
    pub const ALL: [ReportModule; 4] = [
        ReportModule::Brand,
        ReportModule::Market,
        ReportModule::StoreActivity,
        ReportModule::DataStatistics,
    ];

    /// The wire identifier.
    pub fn as_str(self) -> &'static str {
        match self {
            ReportModule::Brand => "brand",
            ReportModule::Market => "market",
            ReportModule::StoreActivity => "store-activity",
            ReportModule::DataStatistics => "data-statistics",
        }
    }

    /// Parse a request-supplied identifier.
    ///
    /// The error names the offending value so the caller's 400 response is
    /// self-explanatory. Surrounding whitespace is tolerated.
    pub fn parse(raw: &str) -> Result<Self, ReportError> {
        match raw.trim() {
            "brand" => Ok(ReportModule::Brand),
            "market" => Ok(ReportModule::Market),
            "store-activity" => Ok(ReportModule::StoreActivity),
            "data-statistics" => Ok(ReportModule::DataStatistics),
            other => Err(ReportError::UnsupportedModule(other.to_string())),
        }
    }

    /// Static display metadata consumed by presentation layers (report
    /// covers, PDF themes). Pure lookup; `ReportModule` is already validated
    /// so there is no failure path.
    pub fn theme(self) -> ModuleTheme {
        match self {
            ReportModule::Brand => ModuleTheme {
                display_name: "品牌定位分析",
                accent_color: "#3b82f6",
                dark_color: "#1e3a8a",
                tint_color: "#eff6ff",
            },
            ReportModule::Market => ModuleTheme {
                display_name: "商圈调研分析",
                accent_color: "#8b5cf6",
                dark_color: "#6d28d9",
                tint_color: "#f5f3ff",
            },
            ReportModule::StoreActivity => ModuleTheme {
                display_name: "店铺活动方案",
                accent_color: "#f97316",
                dark_color: "#9a3412",
                tint_color: "#fff7ed",
            },
            ReportModule::DataStatistics => ModuleTheme {
                display_name: "数据统计分析",
                accent_color: "#667eea",
                dark_color: "#3730a3",
                tint_color: "#eef2ff",
            },
        }
    }
}

impl fmt::Display for ReportModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display metadata (name, colors) associated with a module.
///
/// Used by presentation layers only; the pipeline itself reads
/// `display_name` for title fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModuleTheme {
    pub display_name: &'static str,
    pub accent_color: &'static str,
    pub dark_color: &'static str,
    pub tint_color: &'static str,
}
