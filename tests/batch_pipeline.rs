mod common;

use std::sync::atomic::Ordering;

use serde_json::Value;

use common::{
    harness, record, text, FakeCapture, FakeDirections, FakeGeocoder, FakeStaticMaps,
};
use route_mileage::error::{AppError, BusinessError};
use route_mileage::models::fields;
use route_mileage::services::MileageAudit;
use route_mileage::services::MileageStatus;

const TAIPEI_101: &str = "110台灣台北市信義區信義路五段7號";
const CKS_MEMORIAL: &str = "100台灣台北市中正區中山南路21號";

fn taipei_geocoder() -> FakeGeocoder {
    FakeGeocoder::with(&[("台北101", TAIPEI_101), ("中正紀念堂", CKS_MEMORIAL)])
}

#[tokio::test]
async fn test_taipei_101_to_cks_memorial() {
    let h = harness(
        taipei_geocoder(),
        FakeDirections::with(&[(TAIPEI_101, CKS_MEMORIAL, 5_432)]),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );

    let result = h
        .orchestrator
        .process_batch(vec![record("台北101", "中正紀念堂", "Y")], None)
        .await
        .unwrap();

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(result.total_count, 1);
    assert_eq!(result.computed_count, 1);

    let out = &result.records[0];
    let one_way = out.one_way_km().unwrap();
    assert_eq!(one_way, 5.43);
    assert_eq!(out.get(fields::ROUND_TRIP_KM).and_then(Value::as_f64), Some(one_way * 2.0));
    assert_eq!(text(out, fields::ORIGIN_ADDRESS), Some(TAIPEI_101));
    assert_eq!(text(out, fields::DESTINATION_ADDRESS), Some(CKS_MEMORIAL));
    assert_eq!(text(out, fields::POLYLINE), Some("primary_path"));
    assert_eq!(text(out, fields::ESTIMATED_TIME), Some("12 分鐘"));
    assert_eq!(out.get(fields::STEP_COUNT).and_then(Value::as_u64), Some(2));
    assert_eq!(
        text(out, fields::ROUTE_STEPS),
        Some("1. 朝西方前進 (450 公尺)\n2. 向左轉，走中山南路 (2.1 公里)")
    );
    assert!(text(out, fields::GOOGLE_MAP_URL)
        .unwrap()
        .starts_with("https://www.google.com/maps/dir/?api=1&origin="));

    let map_path = text(out, fields::STATIC_MAP_IMAGE).unwrap();
    assert!(map_path.contains("gmap_route_"));
    assert!(std::path::Path::new(map_path).exists());
    // 截图成功就不再调用静态地图
    assert!(h.static_maps.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unflagged_records_pass_through_untouched() {
    let h = harness(
        taipei_geocoder(),
        FakeDirections::with(&[(TAIPEI_101, CKS_MEMORIAL, 5_432)]),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );
    let input = vec![
        record("台北101", "中正紀念堂", "N"),
        record("台北101", "中正紀念堂", ""),
        record("", "", "no"),
    ];
    let before = serde_json::to_string(&input).unwrap();

    let result = h.orchestrator.process_batch(input, None).await.unwrap();

    assert_eq!(serde_json::to_string(&result.records).unwrap(), before);
    assert!(result.errors.is_empty());
    assert_eq!(result.computed_count, 0);
    assert!(h.directions.calls().is_empty());
}

#[tokio::test]
async fn test_identical_names_yield_single_indexed_error() {
    let h = harness(
        FakeGeocoder::default(),
        FakeDirections::default(),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );
    let input = record("A", "A", "Y");

    let result = h
        .orchestrator
        .process_batch(vec![input.clone()], None)
        .await
        .unwrap();

    assert_eq!(result.errors, vec!["第 1 条记录起点和终点完全相同: A".to_string()]);
    assert_eq!(result.records[0], input);
    assert!(result.records[0].get(fields::ONE_WAY_KM).is_none());
    assert!(h.directions.calls().is_empty());
}

#[tokio::test]
async fn test_colliding_addresses_route_by_names() {
    let h = harness(
        FakeGeocoder::default(),
        FakeDirections::with(&[("總公司", "台北101", 1_200)]),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );
    // 两个不同名称对应到同一个地址
    h.places.add_mapping("台北101", "台北市信義區信義路五段7號");

    let result = h
        .orchestrator
        .process_batch(vec![record("總公司", "台北101", "Y")], None)
        .await
        .unwrap();

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    assert_eq!(
        h.directions.calls(),
        vec![("總公司".to_string(), "台北101".to_string())]
    );
    let out = &result.records[0];
    assert_eq!(text(out, fields::ORIGIN_ADDRESS), Some("總公司"));
    assert_eq!(text(out, fields::DESTINATION_ADDRESS), Some("台北101"));
    assert_eq!(out.one_way_km(), Some(1.2));
}

#[tokio::test]
async fn test_zero_distance_is_rejected() {
    let h = harness(
        taipei_geocoder(),
        FakeDirections::with(&[(TAIPEI_101, CKS_MEMORIAL, 3)]),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );
    let input = record("台北101", "中正紀念堂", "Y");

    let result = h
        .orchestrator
        .process_batch(vec![input.clone()], None)
        .await
        .unwrap();

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("第 1 条记录计算结果为 0 公里"));
    assert_eq!(result.records[0], input);
    assert_eq!(result.computed_count, 0);
    assert_eq!(h.capture.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_minimal_static_map_when_capture_and_overlay_tier_fail() {
    let h = harness(
        taipei_geocoder(),
        FakeDirections::with(&[(TAIPEI_101, CKS_MEMORIAL, 5_432)]),
        FakeCapture::broken(),
        FakeStaticMaps::scripted(vec![Ok(b"<html>error</html>".to_vec())]),
    );

    let result = h
        .orchestrator
        .process_batch(vec![record("台北101", "中正紀念堂", "Y")], None)
        .await
        .unwrap();

    assert!(result.errors.is_empty());
    assert_eq!(result.computed_count, 1);
    let map_path = text(&result.records[0], fields::STATIC_MAP_IMAGE).unwrap();
    assert!(map_path.contains("/map_"));

    let requests = h.static_maps.requests.lock().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].paths.len(), 2);
    assert_eq!(requests[1].paths.len(), 1);
    assert!(requests[1].markers.is_empty());
}

#[tokio::test]
async fn test_all_render_tiers_failing_still_counts_as_computed() {
    let h = harness(
        taipei_geocoder(),
        FakeDirections::with(&[(TAIPEI_101, CKS_MEMORIAL, 5_432)]),
        FakeCapture::broken(),
        FakeStaticMaps::broken(),
    );

    let result = h
        .orchestrator
        .process_batch(vec![record("台北101", "中正紀念堂", "Y")], None)
        .await
        .unwrap();

    assert!(result.errors.is_empty());
    assert_eq!(result.computed_count, 1);
    assert_eq!(result.records[0].get(fields::STATIC_MAP_IMAGE), Some(&Value::Null));
}

#[tokio::test]
async fn test_mixed_batch_keeps_order_and_counts() {
    let h = harness(
        taipei_geocoder(),
        FakeDirections::with(&[(TAIPEI_101, CKS_MEMORIAL, 5_432)]),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );
    let input = vec![
        record("台北101", "中正紀念堂", "N"),
        record("台北101", "", "Y"),
        record("B", "B", "Y"),
        record("台北101", "中正紀念堂", "Y"),
        record("墾丁", "太魯閣", "Y"),
    ];

    let result = h.orchestrator.process_batch(input.clone(), None).await.unwrap();

    assert_eq!(result.total_count, 5);
    assert_eq!(result.computed_count, 1);
    assert_eq!(result.errors.len(), 3);
    assert!(result.errors[0].starts_with("第 2 条记录"));
    assert!(result.errors[1].starts_with("第 3 条记录"));
    assert!(result.errors[2].starts_with("第 5 条记录计算失败"));

    for (i, original) in input.iter().enumerate() {
        if i != 3 {
            assert_eq!(&result.records[i], original, "record {} changed", i + 1);
        }
    }
    assert!(result.records[3].is_computed());
}

#[tokio::test]
async fn test_panic_in_one_record_does_not_abort_batch() {
    let h = harness(
        taipei_geocoder(),
        FakeDirections::with(&[(TAIPEI_101, CKS_MEMORIAL, 5_432)]).panicking_on("爆炸"),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );

    let result = h
        .orchestrator
        .process_batch(
            vec![record("爆炸", "中正紀念堂", "Y"), record("台北101", "中正紀念堂", "Y")],
            None,
        )
        .await
        .unwrap();

    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("第 1 条记录处理失败"));
    assert!(!result.records[0].is_computed());
    assert!(result.records[1].is_computed());
}

#[tokio::test]
async fn test_fixed_origin_overrides_origin_only() {
    let h = harness(
        FakeGeocoder::default(),
        FakeDirections::with(&[("高雄市前鎮區復興四路12號", "高雄市苓雅區四維三路2號", 8_760)]),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );

    let result = h
        .orchestrator
        .process_batch(
            vec![record("總公司", "高雄市政府", "Y")],
            Some("高雄市前鎮區復興四路12號"),
        )
        .await
        .unwrap();

    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let out = &result.records[0];
    assert_eq!(text(out, fields::ORIGIN_ADDRESS), Some("高雄市前鎮區復興四路12號"));
    assert_eq!(text(out, fields::DESTINATION_ADDRESS), Some("高雄市苓雅區四維三路2號"));
    assert_eq!(out.one_way_km(), Some(8.76));
}

#[tokio::test]
async fn test_rerun_produces_new_artifact_with_same_numbers() {
    let h = harness(
        taipei_geocoder(),
        FakeDirections::with(&[(TAIPEI_101, CKS_MEMORIAL, 5_432)]),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );

    let first = h
        .orchestrator
        .process_batch(vec![record("台北101", "中正紀念堂", "Y")], None)
        .await
        .unwrap();
    let second = h
        .orchestrator
        .process_batch(first.records.clone(), None)
        .await
        .unwrap();

    let (a, b) = (&first.records[0], &second.records[0]);
    assert_ne!(
        text(a, fields::STATIC_MAP_IMAGE),
        text(b, fields::STATIC_MAP_IMAGE)
    );
    for key in [fields::ONE_WAY_KM, fields::ROUND_TRIP_KM, fields::POLYLINE, fields::STEP_COUNT] {
        assert_eq!(a.get(key), b.get(key), "{key} differs");
    }
}

#[tokio::test]
async fn test_empty_batch_is_rejected() {
    let h = harness(
        FakeGeocoder::default(),
        FakeDirections::default(),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );

    let err = h.orchestrator.process_batch(Vec::new(), None).await.unwrap_err();
    assert!(matches!(err, AppError::Business(BusinessError::EmptyBatch)));
}

#[tokio::test]
async fn test_mileage_audit_against_recomputed_distance() {
    let h = harness(
        taipei_geocoder(),
        FakeDirections::with(&[(TAIPEI_101, CKS_MEMORIAL, 5_432)]),
        FakeCapture::working(),
        FakeStaticMaps::working(),
    );
    let audit = MileageAudit::new(h.addresses.clone(), h.routes.clone());

    let close = audit.compare(5.0, "台北101", "中正紀念堂").await.unwrap();
    assert_eq!(close.calculated_km, 5.43);
    assert_eq!(close.status, MileageStatus::Match);

    let far = audit.compare(12.0, "台北101", "中正紀念堂").await.unwrap();
    assert_eq!(far.difference_km, 6.57);
    assert_eq!(far.status, MileageStatus::Mismatch);
}
