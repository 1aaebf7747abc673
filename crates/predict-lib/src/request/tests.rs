//! Request builder tests
//!
//! These tests verify:
//! - Build-then-introspect round trips for every payload source
//! - Rejection of zero or multiple payload sources
//! - Modality/payload consistency checks

use super::*;
use crate::error::PredictError;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

const IMAGE_URL: &str = "https://samples.clarifai.com/metro-north.jpg";

fn write_temp(contents: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents).unwrap();
    file.flush().unwrap();
    file
}

mod round_trip_tests {
    use super::*;

    #[test]
    fn test_bytes_round_trip() {
        let request = RequestBuilder::new(Modality::Text)
            .bytes(b"Write a tweet on future of AI".to_vec())
            .build()
            .unwrap();

        assert_eq!(request.modality(), Modality::Text);
        assert_eq!(request.payload_origin(), &PayloadOrigin::Bytes);
        assert_eq!(
            request.input().payload().content(),
            &PayloadContent::Inline(b"Write a tweet on future of AI".to_vec())
        );
    }

    #[test]
    fn test_file_path_round_trip() {
        let file = write_temp(b"I love this so much!");
        let request = RequestBuilder::new(Modality::Text)
            .file_path(file.path())
            .build()
            .unwrap();

        assert_eq!(request.modality(), Modality::Text);
        assert_eq!(
            request.payload_origin(),
            &PayloadOrigin::FilePath(file.path().to_path_buf())
        );
        assert_eq!(
            request.input().payload().content(),
            &PayloadContent::Inline(b"I love this so much!".to_vec())
        );
    }

    #[test]
    fn test_url_round_trip_for_every_media_modality() {
        for modality in [Modality::Image, Modality::Video, Modality::Audio] {
            let request = RequestBuilder::new(modality).url(IMAGE_URL).build().unwrap();
            assert_eq!(request.modality(), modality);
            match request.payload_origin() {
                PayloadOrigin::Url(url) => assert_eq!(url.as_str(), IMAGE_URL),
                other => panic!("unexpected origin {:?}", other),
            }
        }
    }

    #[test]
    fn test_multimodal_carries_prompt() {
        let request = RequestBuilder::for_input_type("multimodal")
            .unwrap()
            .url(IMAGE_URL)
            .prompt("What time of day is it?")
            .params(InferenceParams::new().set("temperature", 0.2).set("max_tokens", 100))
            .build()
            .unwrap();

        assert_eq!(request.modality(), Modality::Multimodal);
        assert_eq!(request.input().prompt(), Some("What time of day is it?"));
        assert_eq!(request.params().len(), 2);
    }

    #[test]
    fn test_output_config_is_kept() {
        let config = OutputConfig::new().sample_ms(2000);
        let request = RequestBuilder::new(Modality::Video)
            .url("https://samples.clarifai.com/beer.mp4")
            .output_config(config.clone())
            .build()
            .unwrap();
        assert_eq!(request.output_config(), &config);
    }
}

mod payload_source_tests {
    use super::*;

    #[test]
    fn test_no_source_is_invalid() {
        let result = RequestBuilder::new(Modality::Image).build();
        assert!(matches!(result, Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn test_multiple_sources_are_invalid() {
        let file = write_temp(b"bytes");
        let combos = [
            RequestBuilder::new(Modality::Image).bytes(vec![1]).url(IMAGE_URL),
            RequestBuilder::new(Modality::Image)
                .bytes(vec![1])
                .file_path(file.path()),
            RequestBuilder::new(Modality::Image)
                .file_path(file.path())
                .url(IMAGE_URL),
            RequestBuilder::new(Modality::Image)
                .bytes(vec![1])
                .file_path(file.path())
                .url(IMAGE_URL),
        ];

        for builder in combos {
            assert!(matches!(
                builder.build(),
                Err(PredictError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_missing_file_is_invalid() {
        let result = RequestBuilder::new(Modality::Image)
            .file_path(PathBuf::from("/definitely/not/here.jpg"))
            .build();
        assert!(matches!(result, Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn test_directory_is_not_a_payload_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = RequestBuilder::new(Modality::Image)
            .file_path(dir.path())
            .build();
        assert!(matches!(result, Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn test_bad_url_is_invalid() {
        for raw in ["not a url", "file:///etc/passwd"] {
            let result = RequestBuilder::new(Modality::Image).url(raw).build();
            assert!(matches!(result, Err(PredictError::InvalidInput(_))));
        }
    }
}

mod modality_tests {
    use super::*;

    #[test]
    fn test_unknown_input_type() {
        let result = RequestBuilder::for_input_type("hologram");
        assert!(matches!(result, Err(PredictError::UnsupportedModality(_))));
    }

    #[test]
    fn test_text_bytes_must_be_utf8() {
        let result = RequestBuilder::new(Modality::Text)
            .bytes(vec![0xff, 0xfe, 0x00])
            .build();
        assert!(matches!(result, Err(PredictError::InvalidInput(_))));

        // Binary bytes are fine for image input
        assert!(RequestBuilder::new(Modality::Image)
            .bytes(vec![0xff, 0xd8, 0xff])
            .build()
            .is_ok());
    }

    #[test]
    fn test_prompt_rules() {
        let missing = RequestBuilder::new(Modality::Multimodal).url(IMAGE_URL).build();
        assert!(matches!(missing, Err(PredictError::InvalidInput(_))));

        let blank = RequestBuilder::new(Modality::Multimodal)
            .url(IMAGE_URL)
            .prompt("   ")
            .build();
        assert!(matches!(blank, Err(PredictError::InvalidInput(_))));

        let misplaced = RequestBuilder::new(Modality::Image)
            .url(IMAGE_URL)
            .prompt("describe")
            .build();
        assert!(matches!(misplaced, Err(PredictError::InvalidInput(_))));
    }

    #[test]
    fn test_invalid_output_config_rejected_at_build() {
        let result = RequestBuilder::new(Modality::Image)
            .url(IMAGE_URL)
            .output_config(OutputConfig::new().sample_ms(2000))
            .build();
        assert!(matches!(result, Err(PredictError::InvalidInput(_))));
    }
}
