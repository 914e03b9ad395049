use serde_json::{Map, Value};

use super::AiError;

/// Joins refined prayers in the model output
pub const PRAYER_SEPARATOR: &str = "---PRAYER---";

pub fn prayer_prompt(prayers: &[String]) -> String {
    let mut prompt = format!(
        "다음은 교회 소그룹에서 나눈 기도제목 {count}개입니다. \
         각 기도제목을 맞춤법과 문장을 다듬어 정중한 기도문 형태로 정리해 주세요. \
         의미를 바꾸거나 내용을 추가하지 마세요. \
         입력과 같은 순서로 정확히 {count}개를 출력하고, 각 항목 사이에는 \
         '{sep}' 한 줄만 넣으세요. 번호나 다른 설명은 붙이지 마세요.\n\n",
        count = prayers.len(),
        sep = PRAYER_SEPARATOR,
    );
    for (i, prayer) in prayers.iter().enumerate() {
        if i > 0 {
            prompt.push_str(PRAYER_SEPARATOR);
            prompt.push('\n');
        }
        prompt.push_str(prayer.trim());
        prompt.push('\n');
    }
    prompt
}

/// Split model output back into one entry per input prayer. Missing entries
/// fall back to the original text; extra entries are dropped.
pub fn split_refined(output: &str, originals: &[String]) -> Vec<String> {
    let mut refined = output
        .split(PRAYER_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty());

    originals
        .iter()
        .map(|original| {
            refined
                .next()
                .map(str::to_string)
                .unwrap_or_else(|| original.trim().to_string())
        })
        .collect()
}

pub fn member_extraction_prompt(text: Option<&str>) -> String {
    let mut prompt = String::from(
        "교회 교인 명단에서 사람별 정보를 추출해 JSON 배열로만 답하세요. \
         각 원소는 다음 키를 가진 객체입니다: \
         full_name, phone, spouse_name, children_info, birth_date (YYYY-MM-DD), \
         wedding_anniversary (YYYY-MM-DD), group_name, \
         role_in_group (\"leader\" 또는 \"member\"), notes. \
         알 수 없는 값은 null로 두고, 명단에 없는 사람을 만들어내지 마세요.",
    );
    if let Some(text) = text.map(str::trim).filter(|t| !t.is_empty()) {
        prompt.push_str("\n\n명단:\n");
        prompt.push_str(text);
    }
    prompt
}

/// Locate and parse the JSON array in a model response. Code fences and
/// surrounding prose are ignored; non-object elements are dropped.
pub fn extract_json_array(output: &str) -> Result<Vec<Map<String, Value>>, AiError> {
    let start = output.find('[');
    let end = output.rfind(']');
    let slice = match (start, end) {
        (Some(start), Some(end)) if start < end => &output[start..=end],
        _ => return Err(AiError::InvalidOutput("no JSON array in response".to_string())),
    };

    let parsed: Vec<Value> =
        serde_json::from_str(slice).map_err(|e| AiError::InvalidOutput(e.to_string()))?;

    Ok(parsed
        .into_iter()
        .filter_map(|v| match v {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect())
}
