use crate::error::{PredictError, Result};
use crate::models::{BoundingBox, Concept, Frame, PredictionResult, Region};
use crate::wire::{
    MultiOutputResponse, WireConcept, WireConceptData, WireFrame, WireImageOut, WireOutputData,
    WireRegion, WireStatus,
};
use base64::{engine::general_purpose::STANDARD, Engine};

/// Decode a prediction response body
pub fn decode(body: &[u8]) -> Result<PredictionResult> {
    let response: MultiOutputResponse = serde_json::from_slice(body)
        .map_err(|e| PredictError::malformed_response(format!("body is not valid JSON: {}", e)))?;

    if let Some(status) = &response.status {
        check_status(status)?;
    }

    let output = response
        .outputs
        .and_then(|outputs| outputs.into_iter().next())
        .ok_or_else(|| PredictError::malformed_response("response carries no outputs"))?;

    if let Some(status) = &output.status {
        check_status(status)?;
    }

    let data = output
        .data
        .ok_or_else(|| PredictError::malformed_response("output carries no data"))?;

    decode_data(data)
}

fn check_status(status: &WireStatus) -> Result<()> {
    if status.is_success() {
        return Ok(());
    }
    Err(PredictError::RemoteRequest {
        http_status: 200,
        code: status.code,
        description: status
            .description
            .clone()
            .unwrap_or_else(|| "prediction failed".to_string()),
        details: status.details.clone(),
    })
}

fn decode_data(data: WireOutputData) -> Result<PredictionResult> {
    if let Some(regions) = data.regions {
        let regions = regions
            .into_iter()
            .enumerate()
            .map(|(i, r)| decode_region(i, r))
            .collect::<Result<Vec<_>>>()?;
        return Ok(PredictionResult::Regions(regions));
    }

    if let Some(frames) = data.frames {
        let frames = frames
            .into_iter()
            .enumerate()
            .map(|(i, f)| decode_frame(i, f))
            .collect::<Result<Vec<_>>>()?;
        return Ok(PredictionResult::Frames(frames));
    }

    if let Some(concepts) = data.concepts {
        return Ok(PredictionResult::Concepts(decode_concepts(concepts)?));
    }

    if let Some(text) = data.text {
        let raw = text
            .raw
            .ok_or_else(|| PredictError::malformed_response("text output has no raw field"))?;
        return Ok(PredictionResult::GeneratedText(raw));
    }

    if let Some(image) = data.image {
        return Ok(PredictionResult::GeneratedImage(decode_media("image", image)?));
    }

    if let Some(audio) = data.audio {
        return Ok(PredictionResult::GeneratedAudio(decode_media("audio", audio)?));
    }

    Err(PredictError::malformed_response(
        "output data has none of regions, frames, concepts, text, image or audio",
    ))
}

fn decode_concepts(concepts: Vec<WireConcept>) -> Result<Vec<Concept>> {
    concepts
        .into_iter()
        .map(|c| -> Result<Concept> {
            let name = c
                .name
                .filter(|n| !n.is_empty())
                .or_else(|| c.id.clone())
                .ok_or_else(|| PredictError::malformed_response("concept has neither name nor id"))?;
            Ok(Concept {
                id: c.id,
                name,
                value: c.value,
            })
        })
        .collect()
}

/// Concepts nested under a region or frame `data` object
///
/// A missing `data` object means no concepts. A `data` object without
/// `concepts` is inconsistent.
fn nested_concepts(owner: &str, data: Option<WireConceptData>) -> Result<Vec<Concept>> {
    match data {
        None => Ok(Vec::new()),
        Some(WireConceptData { concepts: Some(c) }) => decode_concepts(c),
        Some(WireConceptData { concepts: None }) => Err(PredictError::malformed_response(format!(
            "{} has a data field without concepts",
            owner
        ))),
    }
}

fn decode_region(index: usize, region: WireRegion) -> Result<Region> {
    let owner = format!("region {}", index);
    let info = region
        .region_info
        .ok_or_else(|| PredictError::malformed_response(format!("{} has no region_info", owner)))?;

    let bounding_box = info
        .bounding_box
        .map(|b| BoundingBox::new(b.top_row, b.left_col, b.bottom_row, b.right_col));

    let mask = match info.mask {
        None => None,
        Some(mask) => {
            let image = mask.image.ok_or_else(|| {
                PredictError::malformed_response(format!("{} declares a mask without an image", owner))
            })?;
            Some(decode_media(&format!("{} mask", owner), image)?)
        }
    };

    if bounding_box.is_none() && mask.is_none() {
        return Err(PredictError::malformed_response(format!(
            "{} has neither a bounding box nor a mask",
            owner
        )));
    }

    Ok(Region {
        id: region.id,
        bounding_box,
        mask,
        concepts: nested_concepts(&owner, region.data)?,
    })
}

fn decode_frame(index: usize, frame: WireFrame) -> Result<Frame> {
    let info = frame.frame_info.unwrap_or_default();
    Ok(Frame {
        index: info.index,
        time_ms: info.time,
        concepts: nested_concepts(&format!("frame {}", index), frame.data)?,
    })
}

fn decode_media(what: &str, image: WireImageOut) -> Result<Vec<u8>> {
    let encoded = match image.base64 {
        Some(encoded) if !encoded.is_empty() => encoded,
        _ => {
            let hint = image
                .url
                .map(|u| format!(" (only a URL was returned: {})", u))
                .unwrap_or_default();
            return Err(PredictError::malformed_response(format!(
                "{} has no inline bytes{}",
                what, hint
            )));
        }
    };

    STANDARD
        .decode(encoded.as_bytes())
        .map_err(|e| PredictError::malformed_response(format!("{} is not valid base64: {}", what, e)))
}
