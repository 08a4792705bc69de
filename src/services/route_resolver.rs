//! 路线服务 - 业务能力层
//!
//! 向路线服务商查询主路线与备选路线，整理成 `RouteDetail`

use std::sync::{Arc, OnceLock};

use regex::Regex;
use tracing::{debug, info};

use crate::clients::{directions_page_url, DirectionsApi};
use crate::error::{AppResult, RouteError};
use crate::models::route::meters_to_km;
use crate::models::{DirectionsRoute, RouteDetail};

/// 路线服务
pub struct RouteResolver {
    directions: Arc<dyn DirectionsApi>,
    travel_mode: String,
}

impl RouteResolver {
    pub fn new(directions: Arc<dyn DirectionsApi>, travel_mode: impl Into<String>) -> Self {
        Self {
            directions,
            travel_mode: travel_mode.into(),
        }
    }

    /// 查询两地之间的路线
    ///
    /// # 参数
    /// - `origin` / `destination`: 实际送给服务商的地址
    /// - `alternatives`: 是否同时取得备选路线
    ///
    /// # 返回
    /// 服务商没有返回路线时返回 `RouteError::NoRoute`
    pub async fn get_route(
        &self,
        origin: &str,
        destination: &str,
        alternatives: bool,
    ) -> AppResult<RouteDetail> {
        let routes = self
            .directions
            .directions(origin, destination, &self.travel_mode, alternatives)
            .await?;

        let mut routes = routes.into_iter();
        let primary = routes.next().ok_or_else(|| RouteError::NoRoute {
            origin: origin.to_string(),
            destination: destination.to_string(),
        })?;
        let alternative_polylines: Vec<String> = routes
            .map(|route| route.overview_polyline)
            .filter(|polyline| !polyline.is_empty())
            .collect();

        let detail = build_route_detail(primary, alternative_polylines, origin, destination)?;

        info!(
            "🛣️ 路线: {:.2} 公里, {} ({} 步, {} 条备选)",
            detail.one_way_km,
            detail.duration_text,
            detail.step_count(),
            detail.alternative_polylines.len()
        );
        Ok(detail)
    }
}

fn build_route_detail(
    primary: DirectionsRoute,
    alternative_polylines: Vec<String>,
    origin: &str,
    destination: &str,
) -> AppResult<RouteDetail> {
    let leg = primary
        .legs
        .into_iter()
        .next()
        .ok_or_else(|| RouteError::MissingLeg {
            origin: origin.to_string(),
            destination: destination.to_string(),
        })?;

    let one_way_km = meters_to_km(leg.distance_meters);
    let steps = leg
        .steps
        .iter()
        .map(|step| {
            let text = clean_html_instructions(&step.html_instructions);
            if step.distance_text.is_empty() {
                text
            } else {
                format!("{} ({})", text, step.distance_text)
            }
        })
        .collect();

    Ok(RouteDetail {
        one_way_km,
        round_trip_km: one_way_km * 2.0,
        duration_text: leg.duration_text,
        duration_seconds: leg.duration_seconds,
        steps,
        polyline: primary.overview_polyline,
        alternative_polylines,
        map_url: directions_page_url(origin, destination)?,
    })
}

fn block_tag_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"(?i)<\s*(div|br|p)\b[^>]*>").ok())
        .as_ref()
}

fn tag_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<[^>]+>").ok()).as_ref()
}

/// 去除导航文字中的 HTML 标签并还原实体
///
/// 区块标签以空白取代，避免前后文字黏在一起
pub fn clean_html_instructions(html: &str) -> String {
    let mut text = html.to_string();

    if let Some(re) = block_tag_pattern() {
        text = re.replace_all(&text, " ").into_owned();
    }
    if let Some(re) = tag_pattern() {
        text = re.replace_all(&text, "").into_owned();
    }

    // &amp; 最后处理，避免二次还原
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    debug!("导航文字: {}", cleaned);
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RouteLeg, RouteStep};
    use async_trait::async_trait;

    struct FixedDirections(Vec<DirectionsRoute>);

    #[async_trait]
    impl DirectionsApi for FixedDirections {
        async fn directions(
            &self,
            _origin: &str,
            _destination: &str,
            _mode: &str,
            _alternatives: bool,
        ) -> AppResult<Vec<DirectionsRoute>> {
            Ok(self.0.clone())
        }
    }

    fn route(meters: u64, polyline: &str) -> DirectionsRoute {
        DirectionsRoute {
            overview_polyline: polyline.to_string(),
            legs: vec![RouteLeg {
                distance_meters: meters,
                duration_text: "25 分鐘".into(),
                duration_seconds: 1500,
                steps: vec![
                    RouteStep {
                        html_instructions: "朝<b>東</b>方前進".into(),
                        distance_text: "300 公尺".into(),
                    },
                    RouteStep {
                        html_instructions: "向右轉<div style=\"font-size:0.9em\">目的地在右邊</div>".into(),
                        distance_text: "1.2 公里".into(),
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_clean_html_instructions() {
        assert_eq!(clean_html_instructions("朝<b>東</b>方前進"), "朝東方前進");
        assert_eq!(
            clean_html_instructions("向右轉<div style=\"x\">目的地在右邊</div>"),
            "向右轉 目的地在右邊"
        );
        assert_eq!(
            clean_html_instructions("A&nbsp;&amp;&nbsp;B &lt;1&gt; &quot;q&quot;"),
            "A & B <1> \"q\""
        );
        assert_eq!(clean_html_instructions("&amp;lt;"), "&lt;");
    }

    #[tokio::test]
    async fn test_primary_route_and_alternatives() {
        let resolver = RouteResolver::new(
            Arc::new(FixedDirections(vec![route(13_126, "primary"), route(15_000, "alt")])),
            "driving",
        );

        let detail = resolver.get_route("台北101", "中正紀念堂", true).await.unwrap();

        assert_eq!(detail.one_way_km, 13.13);
        assert_eq!(detail.round_trip_km, detail.one_way_km * 2.0);
        assert_eq!(detail.polyline, "primary");
        assert_eq!(detail.alternative_polylines, vec!["alt".to_string()]);
        assert_eq!(detail.steps[0], "朝東方前進 (300 公尺)");
        assert_eq!(detail.steps[1], "向右轉 目的地在右邊 (1.2 公里)");
        assert_eq!(detail.duration_seconds, 1500);
        assert!(detail.map_url.contains("travelmode=driving"));
    }

    #[tokio::test]
    async fn test_empty_result_is_no_route() {
        let resolver = RouteResolver::new(Arc::new(FixedDirections(Vec::new())), "driving");
        let err = resolver.get_route("A", "B", true).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Route(RouteError::NoRoute { .. })
        ));
    }

    #[tokio::test]
    async fn test_route_without_leg() {
        let resolver = RouteResolver::new(
            Arc::new(FixedDirections(vec![DirectionsRoute::default()])),
            "driving",
        );
        let err = resolver.get_route("A", "B", false).await.unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Route(RouteError::MissingLeg { .. })
        ));
    }
}
