use schedule_form::{
    interpret_response, AnalysisResult, AnalyzeError, Submission, ValidationError,
    ANALYZE_ENDPOINT, FIELD_SCHEDULE_IMAGE,
};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{File, FormData, Headers, Request, RequestInit, Response};

/// Posts the submission to the analyze endpoint and classifies the reply.
/// `image` is the file picked in the form; it is only read in image mode.
pub async fn post_submission(
    submission: &Submission,
    image: Option<File>,
) -> Result<AnalysisResult, AnalyzeError> {
    let init = RequestInit::new();
    init.set_method("POST");

    match submission {
        Submission::Image(upload) => {
            let file = image.ok_or(ValidationError::MissingImage)?;
            let form = FormData::new().map_err(js_error)?;
            form.append_with_blob_and_filename(FIELD_SCHEDULE_IMAGE, &file, &file.name())
                .map_err(js_error)?;
            for (name, value) in upload.text_fields() {
                form.append_with_str(name, value).map_err(js_error)?;
            }
            init.set_body(&form.into());
        }
        Submission::Manual(request) => {
            let body = serde_json::to_string(request)
                .map_err(|err| AnalyzeError::Unexpected(format!("failed to encode request: {err}")))?;
            let headers = Headers::new().map_err(js_error)?;
            if let Some(content_type) = submission.content_type() {
                headers.set("Content-Type", content_type).map_err(js_error)?;
            }
            init.set_headers(&headers.into());
            init.set_body(&JsValue::from_str(&body));
        }
    }

    let request = Request::new_with_str_and_init(ANALYZE_ENDPOINT, &init).map_err(js_error)?;
    let window =
        web_sys::window().ok_or_else(|| AnalyzeError::Unexpected("no window available".into()))?;
    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(js_error)?
        .dyn_into()
        .map_err(js_error)?;
    let text = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)?;
    interpret_response(response.status(), &text.as_string().unwrap_or_default())
}

fn js_error(value: JsValue) -> AnalyzeError {
    let message = value
        .dyn_ref::<js_sys::Error>()
        .map(|err| String::from(err.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{value:?}"));
    AnalyzeError::Unexpected(message)
}
