//! Prompt templates for the four report modules.
//!
//! Centralising every template here serves two purposes:
//!
//! 1. **Single source of truth** — the output rules (Markdown only, no
//!    greeting, no HTML, no fences) appear in one constant instead of four
//!    copies that drift apart.
//!
//! 2. **Testability** — unit tests render prompts from fixture payloads and
//!    assert on labels and placeholders without touching the network.
//!
//! Every fact line goes through the [`crate::payload`] formatter, so a blank
//! or missing field always renders as 未提供. An empty value in the facts
//! section is the main trigger for hallucinated facts, which is why the
//! placeholder policy lives in the formatter and not in each template.

use crate::module::ReportModule;
use crate::payload::{is_truthy, stat_field, text_field_or_placeholder, NOT_PROVIDED};
use serde_json::Value;

/// Operator persona for the primary generation call.
pub const SYSTEM_PROMPT: &str = "你是一位资深的餐饮外卖运营与市场分析专家。你的目标是输出清晰、可执行、可落地的建议。严格输出Markdown正文，不要输出任何问候/开场白；不要输出HTML标签；不要用```包裹全文。";

/// Editor persona for the repair call.
pub const REPAIR_SYSTEM_PROMPT: &str = "你是一位专业内容编辑，擅长将文本整理为结构清晰的Markdown。";

/// Output rules repeated in every user prompt.
const OUTPUT_RULES: &str =
    "要求：只输出Markdown正文，不要输出任何问候/开场白；不要输出HTML标签；不要用```包裹全文。";

/// At most this many menu entries are rendered into the store-activity
/// prompt. Entries beyond the cap are silently dropped — the cap bounds
/// prompt length and cost.
const MENU_PREVIEW_LIMIT: usize = 30;

/// At most this many characters of contaminated output are embedded into the
/// repair prompt.
const REPAIR_INPUT_LIMIT: usize = 12_000;

/// Render the user prompt for a module. Total over the enum — an
/// unrecognized module cannot reach this point past [`ReportModule::parse`].
pub fn build_prompt(module: ReportModule, payload: &Value) -> String {
    match module {
        ReportModule::Brand => build_brand_prompt(payload),
        ReportModule::Market => build_market_prompt(payload),
        ReportModule::StoreActivity => build_store_activity_prompt(payload),
        ReportModule::DataStatistics => build_data_statistics_prompt(payload),
    }
}

/// 餐饮品牌定位分析报告。
pub fn build_brand_prompt(payload: &Value) -> String {
    let store_name = text_field_or_placeholder(payload, &["storeName"]);
    let category = text_field_or_placeholder(payload, &["category"]);
    let address = text_field_or_placeholder(payload, &["address"]);
    let target_group = text_field_or_placeholder(payload, &["targetGroup"]);
    let price_range = text_field_or_placeholder(payload, &["priceRange"]);
    let main_products = text_field_or_placeholder(payload, &["mainProducts"]);

    format!(
        "请基于以下信息输出一份餐饮品牌定位分析报告。\n\
         {OUTPUT_RULES}\n\n\
         ## 店铺信息\n\
         - 店铺名称：{store_name}\n\
         - 经营品类：{category}\n\
         - 店铺地址：{address}\n\
         - 目标客群：{target_group}\n\
         - 人均价格：{price_range}\n\
         - 主营产品：{main_products}\n\n\
         请重点给出：定位结论、差异化卖点、菜单结构建议、价格带建议、包装与品牌表达建议、\
         美团外卖运营建议（转化、复购、活动），并尽量用清晰的小标题和要点列表呈现。\n"
    )
}

/// 商圈调研分析报告。
///
/// `enableScreenshotAnalysis` only changes the wording of the 截图分析 line;
/// whether an image part is actually attached is decided by the orchestrator
/// from the presence of a screenshot.
pub fn build_market_prompt(payload: &Value) -> String {
    let area_name = text_field_or_placeholder(payload, &["areaName"]);
    let location = text_field_or_placeholder(payload, &["location"]);
    let area_type = text_field_or_placeholder(payload, &["areaType"]);
    let store_name = text_field_or_placeholder(payload, &["storeName"]);

    let screenshot_enabled = is_truthy(payload.get("enableScreenshotAnalysis"));
    let (screenshot_state, screenshot_hint) = if screenshot_enabled {
        ("开启", "会提供一张美团外卖竞品截图，请结合截图内容给出分析与建议。")
    } else {
        ("关闭", "不提供截图，仅根据文本信息分析。")
    };

    format!(
        "请输出一份商圈调研分析报告（面向外卖经营/选址/投放决策）。\n\
         {OUTPUT_RULES}\n\n\
         ## 商圈信息\n\
         - 商圈名称：{area_name}\n\
         - 所在位置：{location}\n\
         - 商圈类型：{area_type}\n\
         - 拟开店/参考店铺：{store_name}\n\
         - 截图分析：{screenshot_state}（{screenshot_hint}）\n\n\
         请覆盖：客群画像、消费水平、餐饮业态、竞争强度、机会点与风险点、\
         针对美团外卖的具体动作（菜品结构、定价、活动、配送、评价与复购）。\n"
    )
}

/// 美团外卖店铺活动方案。
pub fn build_store_activity_prompt(payload: &Value) -> String {
    let store_name = text_field_or_placeholder(payload, &["storeName", "store-name"]);
    let store_address = text_field_or_placeholder(payload, &["storeAddress", "store-address"]);
    let category = text_field_or_placeholder(payload, &["businessCategory", "business-category"]);
    let hours = text_field_or_placeholder(payload, &["businessHours", "business-hours"]);

    let menu_preview = render_menu_preview(payload.get("menuItems"));
    let menu_section = if menu_preview.is_empty() {
        format!("- {NOT_PROVIDED}")
    } else {
        menu_preview
    };

    format!(
        "请基于以下信息输出一份“美团外卖店铺活动方案”。\n\
         {OUTPUT_RULES}\n\n\
         ## 店铺信息\n\
         - 店铺名称：{store_name}\n\
         - 店铺地址：{store_address}\n\
         - 经营品类：{category}\n\
         - 营业时间：{hours}\n\n\
         ## 菜品（节选）\n\
         {menu_section}\n\n\
         请给出：满减/配送费/返券/秒杀/套餐搭配/好评返券等方案，\
         并包含执行时间、门槛、目标（转化/复购/评分）与注意事项。\n"
    )
}

/// 外卖店铺数据统计分析报告。
///
/// Every funnel number goes through the numeric formatter: zero is a real
/// measurement and must survive, only null/missing/blank become 未提供.
pub fn build_data_statistics_prompt(payload: &Value) -> String {
    let store_name = text_field_or_placeholder(payload, &["storeName"]);
    let store_address = text_field_or_placeholder(payload, &["storeAddress"]);
    let category = text_field_or_placeholder(payload, &["businessCategory"]);
    let business_hours = text_field_or_placeholder(payload, &["businessHours"]);

    format!(
        "请基于以下30天运营数据，输出一份外卖店铺数据统计分析报告。\n\
         {OUTPUT_RULES}\n\n\
         ## 店铺信息\n\
         - 店铺名称：{store_name}\n\
         - 店铺地址：{store_address}\n\
         - 经营品类：{category}\n\
         - 营业时间：{business_hours}\n\n\
         ## 核心漏斗数据（30天）\n\
         - 曝光人数：{exposure}\n\
         - 入店人数：{visits}\n\
         - 下单人数：{orders}\n\
         - 入店转化率：{visit_conversion}%\n\
         - 下单转化率：{order_conversion}%\n\n\
         ## 配送服务设置\n\
         - 起送价：{min_order}\n\
         - 配送费：{delivery_fee}\n\
         - 配送范围：{delivery_range}\n\n\
         ## 店铺权重与服务开通\n\
         - 闲时出餐时长：{idle_cooking}分钟\n\
         - 忙时出餐时长：{busy_cooking}分钟\n\
         - 青山公益：{green_charity}\n\
         - 到店自取：{self_pickup}\n\
         - 接受预订单：{pre_order}\n\
         - 准时宝：{on_time}\n\
         - 放心吃：{food_safety}\n\n\
         请分析：漏斗问题定位、配送竞争力、店铺权重设置影响、\
         以及最重要的3-5条可执行优化动作（按优先级排序）。\n",
        exposure = stat_field(payload, "exposureCount"),
        visits = stat_field(payload, "visitCount"),
        orders = stat_field(payload, "orderCount"),
        visit_conversion = stat_field(payload, "visitConversion"),
        order_conversion = stat_field(payload, "orderConversion"),
        min_order = stat_field(payload, "minOrderPrice"),
        delivery_fee = stat_field(payload, "deliveryFee"),
        delivery_range = stat_field(payload, "deliveryRange"),
        idle_cooking = stat_field(payload, "idleCookingTime"),
        busy_cooking = stat_field(payload, "busyCookingTime"),
        green_charity = stat_field(payload, "greenCharity"),
        self_pickup = stat_field(payload, "selfPickup"),
        pre_order = stat_field(payload, "preOrder"),
        on_time = stat_field(payload, "onTimeGuarantee"),
        food_safety = stat_field(payload, "foodSafety"),
    )
}

/// Corrective prompt embedding (a bounded slice of) the contaminated text.
pub fn build_repair_prompt(contaminated: &str) -> String {
    let excerpt: String = contaminated.chars().take(REPAIR_INPUT_LIMIT).collect();
    format!(
        "请将下面内容转换为Markdown正文（只输出Markdown，不要HTML，不要```包裹全文），\
         保持信息完整，不要添加额外内容：\n\n{excerpt}"
    )
}

/// Render `menuItems` as bullet lines, from either a record list or a
/// newline-delimited string. Returns an empty string when nothing usable
/// remains after trimming.
fn render_menu_preview(menu_items: Option<&Value>) -> String {
    match menu_items {
        Some(Value::Array(items)) => {
            let lines: Vec<String> = items
                .iter()
                .take(MENU_PREVIEW_LIMIT)
                .filter_map(|item| {
                    let name = crate::payload::text_field(item, &["name"]);
                    if name.is_empty() {
                        return None;
                    }
                    let price = crate::payload::text_field(item, &["price"]);
                    let price = if price.is_empty() {
                        "未标价".to_string()
                    } else {
                        price
                    };
                    Some(format!("- {name}（{price}）"))
                })
                .collect();
            lines.join("\n")
        }
        Some(Value::String(raw)) => raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(MENU_PREVIEW_LIMIT)
            .map(|line| format!("- {line}"))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}
