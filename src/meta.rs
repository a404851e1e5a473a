//! Report metadata derived from module and payload.
//!
//! Titles follow a module-specific fallback chain ending at the module's
//! display name, so a completely empty payload still produces a presentable
//! cover. This function never fails — absent fields degrade to fallback text.

use crate::module::ReportModule;
use crate::payload::text_field;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Subtitle used when the payload carries no business category.
const BRAND_TAGLINE: &str = "呈尚策划 · 专业分析";

/// Human-readable title and subtitle shown on report covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMeta {
    pub title: String,
    pub subtitle: String,
}

/// Derive cover metadata. Pure and infallible.
pub fn build_meta(module: ReportModule, payload: &Value) -> ReportMeta {
    let store_name = text_field(payload, &["storeName", "store-name"]);
    let area_name = text_field(payload, &["areaName"]);
    let category = text_field(payload, &["category", "businessCategory"]);
    let display_name = module.theme().display_name;

    let title = match module {
        ReportModule::Market => {
            let base = first_non_empty(&[area_name.as_str(), store_name.as_str()], display_name);
            format!("{base} 商圈调研分析报告")
        }
        ReportModule::StoreActivity => {
            let base = first_non_empty(&[store_name.as_str()], display_name);
            format!("{base} 店铺活动方案")
        }
        ReportModule::DataStatistics => {
            let base = first_non_empty(&[store_name.as_str()], display_name);
            format!("{base} 数据统计分析报告")
        }
        ReportModule::Brand => {
            let base = first_non_empty(&[store_name.as_str()], display_name);
            format!("{base} 品牌定位分析报告")
        }
    };

    let subtitle = if category.is_empty() {
        BRAND_TAGLINE.to_string()
    } else {
        category
    };

    ReportMeta { title, subtitle }
}

fn first_non_empty<'a>(candidates: &[&'a str], fallback: &'a str) -> &'a str {
    candidates
        .iter()
        .copied()
        .find(|s| !s.is_empty())
        .unwrap_or(fallback)
}
