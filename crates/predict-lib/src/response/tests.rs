//! Response decoder tests
//!
//! These tests verify:
//! - Discriminant dispatch for every output kind
//! - Region masks decoded only when present
//! - Inconsistent or incomplete bodies surface as malformed responses

use super::*;
use crate::error::PredictError;
use crate::models::{PredictionResult, ResultKind};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};

fn body(data: Value) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "status": {"code": 10000, "description": "Ok"},
        "outputs": [{
            "id": "out-1",
            "status": {"code": 10000, "description": "Ok"},
            "data": data
        }]
    }))
    .unwrap()
}

mod dispatch_tests {
    use super::*;

    #[test]
    fn test_concepts_in_source_order() {
        let result = decode(&body(json!({
            "concepts": [
                {"id": "ai_1", "name": "train", "value": 0.9997},
                {"id": "ai_2", "name": "railway", "value": 0.9986},
                {"id": "ai_3", "name": "subway system", "value": 0.9951}
            ]
        })))
        .unwrap();

        match result {
            PredictionResult::Concepts(concepts) => {
                let pairs: Vec<_> = concepts.iter().map(|c| (c.name.as_str(), c.value)).collect();
                assert_eq!(
                    pairs,
                    vec![("train", 0.9997), ("railway", 0.9986), ("subway system", 0.9951)]
                );
            }
            other => panic!("expected concepts, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_regions_take_precedence_over_concepts() {
        let result = decode(&body(json!({
            "concepts": [{"name": "elephant", "value": 0.9}],
            "regions": [{
                "region_info": {"bounding_box": {"top_row": 0.1, "left_col": 0.2, "bottom_row": 0.5, "right_col": 0.6}},
                "data": {"concepts": [{"name": "elephant", "value": 0.99}]}
            }]
        })))
        .unwrap();
        assert_eq!(result.kind(), ResultKind::Regions);
    }

    #[test]
    fn test_frames() {
        let result = decode(&body(json!({
            "frames": [
                {"frame_info": {"time": 1000}, "data": {"concepts": [{"name": "beer", "value": 0.98}]}},
                {"frame_info": {"index": 1, "time": 3000}, "data": {"concepts": [{"name": "glass", "value": 0.95}]}}
            ]
        })))
        .unwrap();

        match result {
            PredictionResult::Frames(frames) => {
                assert_eq!(frames.len(), 2);
                assert_eq!(frames[0].index, 0);
                assert_eq!(frames[0].time_ms, 1000);
                assert_eq!(frames[1].index, 1);
                assert_eq!(frames[1].concepts[0].name, "glass");
            }
            other => panic!("expected frames, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_generated_text() {
        let result = decode(&body(json!({
            "text": {"raw": "a statue of liberty in new york"}
        })))
        .unwrap();
        assert_eq!(result.as_text(), Some("a statue of liberty in new york"));
    }

    #[test]
    fn test_generated_image_and_audio() {
        let png = vec![0x89, b'P', b'N', b'G'];
        let result = decode(&body(json!({"image": {"base64": STANDARD.encode(&png)}}))).unwrap();
        assert_eq!(result, PredictionResult::GeneratedImage(png.clone()));

        let result = decode(&body(json!({"audio": {"base64": STANDARD.encode(b"RIFF")}}))).unwrap();
        assert_eq!(result, PredictionResult::GeneratedAudio(b"RIFF".to_vec()));
    }

    #[test]
    fn test_zero_scores_and_coordinates_default() {
        let result = decode(&body(json!({
            "regions": [{
                "region_info": {"bounding_box": {"bottom_row": 0.5, "right_col": 0.5}},
                "data": {"concepts": [{"name": "sky"}]}
            }]
        })))
        .unwrap();

        match result {
            PredictionResult::Regions(regions) => {
                let bbox = regions[0].bounding_box.unwrap();
                assert_eq!(bbox.top_row, 0.0);
                assert_eq!(bbox.left_col, 0.0);
                assert_eq!(regions[0].concepts[0].value, 0.0);
            }
            other => panic!("expected regions, got {:?}", other.kind()),
        }
    }
}

mod mask_tests {
    use super::*;

    #[test]
    fn test_only_first_region_has_mask() {
        let mask = STANDARD.encode([0x89, b'P', b'N', b'G', 0x0d, 0x0a]);
        let bbox = json!({"top_row": 0.1, "left_col": 0.1, "bottom_row": 0.4, "right_col": 0.4});
        let result = decode(&body(json!({
            "regions": [
                {"region_info": {"bounding_box": bbox, "mask": {"image": {"base64": mask}}},
                 "data": {"concepts": [{"name": "sky", "value": 0.41}]}},
                {"region_info": {"bounding_box": bbox},
                 "data": {"concepts": [{"name": "tree", "value": 0.22}]}},
                {"region_info": {"bounding_box": bbox},
                 "data": {"concepts": [{"name": "grass", "value": 0.12}]}}
            ]
        })))
        .unwrap();

        match result {
            PredictionResult::Regions(regions) => {
                assert_eq!(regions.len(), 3);
                assert_eq!(regions.iter().filter(|r| r.has_mask()).count(), 1);
                assert!(regions[0].has_mask());
                assert!(regions.iter().all(|r| r.bounding_box.is_some()));
            }
            other => panic!("expected regions, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_mask_only_region_is_valid() {
        let mask = STANDARD.encode([1u8, 2, 3]);
        let result = decode(&body(json!({
            "regions": [{"region_info": {"mask": {"image": {"base64": mask}}},
                         "data": {"concepts": [{"name": "road", "value": 0.3}]}}]
        })))
        .unwrap();

        match result {
            PredictionResult::Regions(regions) => {
                assert!(regions[0].bounding_box.is_none());
                assert_eq!(regions[0].mask.as_deref(), Some(&[1u8, 2, 3][..]));
            }
            other => panic!("expected regions, got {:?}", other.kind()),
        }
    }

    #[test]
    fn test_undecodable_mask_is_malformed() {
        let result = decode(&body(json!({
            "regions": [{"region_info": {"mask": {"image": {"base64": "***not base64***"}}}}]
        })));
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));
    }

    #[test]
    fn test_mask_without_image_is_malformed() {
        let result = decode(&body(json!({
            "regions": [{"region_info": {"bounding_box": {"top_row": 0.1}, "mask": {}}}]
        })));
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));
    }
}

mod malformed_tests {
    use super::*;

    #[test]
    fn test_missing_discriminant() {
        let result = decode(&body(json!({})));
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));
    }

    #[test]
    fn test_missing_outputs() {
        let result = decode(br#"{"status": {"code": 10000}}"#);
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));

        let result = decode(br#"{"status": {"code": 10000}, "outputs": []}"#);
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));
    }

    #[test]
    fn test_not_json() {
        let result = decode(b"<html>Bad Gateway</html>");
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));
    }

    #[test]
    fn test_text_without_raw() {
        let result = decode(&body(json!({"text": {}})));
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));

        // An empty generation is still a generation
        let result = decode(&body(json!({"text": {"raw": ""}}))).unwrap();
        assert_eq!(result, PredictionResult::GeneratedText(String::new()));
    }

    #[test]
    fn test_region_data_without_concepts() {
        let result = decode(&body(json!({
            "regions": [{
                "region_info": {"bounding_box": {"top_row": 0.1, "bottom_row": 0.2}},
                "data": {}
            }]
        })));
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));
    }

    #[test]
    fn test_region_without_geometry() {
        let result = decode(&body(json!({
            "regions": [{"region_info": {}, "data": {"concepts": []}}]
        })));
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));
    }

    #[test]
    fn test_generated_image_without_bytes() {
        let result = decode(&body(json!({"image": {"url": "https://example.com/x.png"}})));
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));
    }

    #[test]
    fn test_nameless_concept() {
        let result = decode(&body(json!({"concepts": [{"value": 0.5}]})));
        assert!(matches!(result, Err(PredictError::MalformedResponse(_))));

        // Falls back to the id when the name is absent
        let result = decode(&body(json!({"concepts": [{"id": "ai_x", "value": 0.5}]}))).unwrap();
        assert_eq!(result.concepts()[0].name, "ai_x");
    }

    #[test]
    fn test_failed_output_status_is_remote_error() {
        let result = decode(
            &serde_json::to_vec(&json!({
                "status": {"code": 10000},
                "outputs": [{"status": {"code": 21200, "description": "Model is deploying"}}]
            }))
            .unwrap(),
        );
        match result {
            Err(PredictError::RemoteRequest { code, description, .. }) => {
                assert_eq!(code, Some(21200));
                assert_eq!(description, "Model is deploying");
            }
            other => panic!("expected remote error, got {:?}", other),
        }
    }
}
