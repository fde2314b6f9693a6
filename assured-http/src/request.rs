//! Translation between a merged [`RequestSpec`] and reqwest.

use std::time::Instant;

use assured_core::{AssuredError, RequestSpec, Response};
use http::header::{CONTENT_TYPE, COOKIE};
use http::{HeaderMap, HeaderName, HeaderValue};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder};
use tracing::debug;

use crate::HttpTransportError;

const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

fn invalid_header(name: &str, message: impl ToString) -> AssuredError {
    AssuredError::InvalidHeader {
        name: name.to_string(),
        message: message.to_string(),
    }
}

fn append_header(headers: &mut HeaderMap, name: &str, value: &str) -> assured_core::Result<()> {
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid_header(name, e))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid_header(name, e))?;
    headers.append(header_name, header_value);
    Ok(())
}

/// Headers as they go on the wire: declared headers in order, the auth
/// header, then one `Cookie` header joining every cookie.
pub(crate) fn wire_headers(request: &RequestSpec) -> assured_core::Result<HeaderMap> {
    let encoder = request.get_config().encoder();
    let mut headers = HeaderMap::new();

    for (name, value) in request.get_headers().iter() {
        if name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()) {
            append_header(&mut headers, name, &encoder.content_type_with_charset(value))?;
        } else {
            append_header(&mut headers, name, value)?;
        }
    }

    if let Some(auth) = request.get_auth() {
        let (name, value) = auth.header();
        headers.remove(name.as_str());
        append_header(&mut headers, &name, &value)?;
    }

    let cookies = request.get_cookies();
    if !cookies.is_empty() {
        let joined = cookies
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; ");
        headers.remove(COOKIE);
        append_header(&mut headers, COOKIE.as_str(), &joined)?;
    }

    Ok(headers)
}

fn multipart_form(request: &RequestSpec) -> Result<Form, HttpTransportError> {
    let mut form = Form::new();
    for (name, value) in request.effective_form_params().iter() {
        form = form.text(name.to_string(), value.clone());
    }
    for (name, part) in request.get_multiparts().iter() {
        let mut wire = Part::bytes(part.content().to_vec());
        if let Some(file_name) = part.file_name() {
            wire = wire.file_name(file_name.to_string());
        }
        if let Some(mime_type) = part.mime_type() {
            wire = wire
                .mime_str(mime_type)
                .map_err(|_| HttpTransportError::InvalidMimeType {
                    control_name: name.to_string(),
                    mime_type: mime_type.to_string(),
                })?;
        }
        form = form.part(name.to_string(), wire);
    }
    Ok(form)
}

/// Build the reqwest request for a fully merged specification.
pub(crate) fn build_request(
    client: &Client,
    request: &RequestSpec,
) -> assured_core::Result<RequestBuilder> {
    let url = request.resolve_uri()?;
    let method = request.method_or_default();
    let mut headers = wire_headers(request)?;

    let mut builder = client.request(method, url);

    if !request.get_multiparts().is_empty() {
        // reqwest sets the multipart content type with its boundary.
        headers.remove(CONTENT_TYPE);
        builder = builder.multipart(multipart_form(request)?);
    } else if let Some(body) = request.get_body() {
        builder = builder.body(body.to_vec());
    } else {
        let form = request.effective_form_params();
        if !form.is_empty() {
            let pairs: Vec<(&str, &str)> =
                form.iter().map(|(name, value)| (name, value.as_str())).collect();
            let encoded = serde_urlencoded::to_string(pairs).map_err(HttpTransportError::from)?;
            if !headers.contains_key(CONTENT_TYPE) {
                let content_type = request
                    .get_config()
                    .encoder()
                    .content_type_with_charset(FORM_URLENCODED);
                append_header(&mut headers, CONTENT_TYPE.as_str(), &content_type)?;
            }
            builder = builder.body(encoded);
        }
    }

    Ok(builder.headers(headers))
}

/// Send the request and read the whole response.
pub(crate) fn send(client: &Client, request: &RequestSpec) -> assured_core::Result<Response> {
    let builder = build_request(client, request)?;

    let start = Instant::now();
    let response = builder.send().map_err(HttpTransportError::from)?;
    let status = response.status();
    let headers = response.headers().clone();
    let url = response.url().clone();
    let body = response.bytes().map_err(HttpTransportError::from)?;
    let elapsed = start.elapsed();

    debug!(
        status = status.as_u16(),
        url = %url,
        elapsed_ms = elapsed.as_millis() as u64,
        "Received response"
    );

    let mut response = Response::new(status, headers, body).with_url(url);
    response.set_time(elapsed);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assured_core::config::{ConfigLayer, EncoderConfig};

    #[test]
    fn test_wire_headers_join_cookies_and_add_auth() {
        let request = RequestSpec::new()
            .header("X-Trace", "1")
            .cookie("a", "1")
            .cookie("b", "2")
            .basic_auth("user", "pass");

        let headers = wire_headers(&request).unwrap();
        assert_eq!(headers.get("x-trace").unwrap(), "1");
        assert_eq!(headers.get(COOKIE).unwrap(), "a=1; b=2");
        assert_eq!(headers.get("authorization").unwrap(), "Basic dXNlcjpwYXNz");
    }

    #[test]
    fn test_content_type_gets_default_charset() {
        let request = RequestSpec::new().content_type("application/json");
        let headers = wire_headers(&request).unwrap();
        assert_eq!(
            headers.get(CONTENT_TYPE).unwrap(),
            "application/json; charset=UTF-8"
        );

        let request = RequestSpec::new().content_type("text/plain");
        let headers = wire_headers(&request).unwrap();
        assert_eq!(
            headers.get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=ISO-8859-1"
        );

        let request = RequestSpec::new()
            .content_type("application/json")
            .config(ConfigLayer::new().with_encoder(
                EncoderConfig::new().append_default_content_charset_to_content_type(false),
            ));
        let headers = wire_headers(&request).unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn test_json_body_is_labelled_utf8() {
        let request = RequestSpec::new()
            .json(&serde_json::json!({"name": "Zoë"}))
            .unwrap();
        let headers = wire_headers(&request).unwrap();
        assert_eq!(
            headers.get(CONTENT_TYPE).unwrap(),
            "application/json; charset=UTF-8"
        );
        assert_eq!(
            request.get_body().map(|b| b.as_ref()),
            Some("{\"name\":\"Zoë\"}".as_bytes())
        );
    }

    #[test]
    fn test_invalid_header_is_a_configuration_error() {
        let request = RequestSpec::new().header("Bad Header", "x");
        let err = wire_headers(&request).unwrap_err();
        assert!(matches!(err, AssuredError::InvalidHeader { .. }));
    }
}
