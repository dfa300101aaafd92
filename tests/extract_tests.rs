use notellm::extract::{brace_candidate, escape_control_chars, extract, strip_fences};
use notellm::{Error, LlmResponse, Outcome, OutcomeStatus, ResultData};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};

const INNER: &str = r#"{"outcome":{"status":"success","code":"OK"},"data":{"rewritten_text":"Short.","detected_language":"en"}}"#;

#[test]
fn direct_parse_wins()
{   let value = assert_ok!(extract(INNER));
    assert_eq!(value["data"]["rewritten_text"], "Short.");
}

#[test]
fn fenced_output_equals_bare_output()
{   let fenced = format!("```json\n{}\n```", INNER);
    assert_eq!(extract(&fenced).unwrap(), extract(INNER).unwrap());

    let plain_fence = format!("```\n{}\n```  \n", INNER);
    assert_eq!(extract(&plain_fence).unwrap(), extract(INNER).unwrap());
}

#[test]
fn surrounding_prose_is_discarded()
{   let raw = format!("Sure! Here is the result:\n{}\nLet me know.", INNER);
    assert_eq!(extract(&raw).unwrap(), extract(INNER).unwrap());
}

#[test]
fn raw_control_characters_inside_strings_are_repaired()
{   let raw = "```json\n{\n  \"outcome\": {\"status\": \"success\", \"code\": \"OK\"},\n  \"data\": {\"rewritten_text\": \"first line\nsecond\tline\r\n\", \"detected_language\": \"en\"}\n}\n```";
    let value = assert_ok!(extract(raw));
    assert_eq!(value["data"]["rewritten_text"], "first line\nsecond\tline\r\n");
}

#[test]
fn escaping_leaves_structure_and_existing_escapes_alone()
{   let candidate = "{\n\t\"a\": \"x\\\"y\nz\"\n}";
    let escaped = escape_control_chars(candidate);
    assert_eq!(escaped, "{\n\t\"a\": \"x\\\"y\\nz\"\n}");
    let value: serde_json::Value = serde_json::from_str(&escaped).unwrap();
    assert_eq!(value["a"], "x\"y\nz");
}

#[test]
fn missing_braces_is_reported()
{   for raw in ["I cannot help with that.", "", "} backwards {", "[1, 2, 3]"]
    {   match extract(raw)
        {   Err(Error::Extraction(msg)) => {
              assert_eq!(msg, "no JSON object found", "input {:?}", raw);
            }
          , other => panic!("expected extraction error for {:?}, got {:?}", raw, other)
        }
    }
}

#[test]
fn unrecoverable_object_is_reported_as_parse_failure()
{   let err = assert_err!(extract("{ this is not json at all }"));
    match err
    {   Error::Extraction(msg) => assert!(msg.starts_with("parse failed"), "{}", msg)
      , other => panic!("unexpected {:?}", other)
    }
}

#[test]
fn non_object_json_is_rejected_directly()
{   // A bare string is valid JSON but not a structured result.
    assert_err!(extract("\"just a string\""));
}

#[test]
fn fences_and_braces_helpers()
{   assert_eq!(strip_fences("  ```json\n{}\n```  "), "{}");
    assert_eq!(
      brace_candidate("noise {\"a\": {\"b\": 1}} tail").as_deref(),
      Some("{\"a\": {\"b\": 1}}")
    );
    assert_eq!(brace_candidate("no braces"), None);
}

#[test]
fn serialized_responses_round_trip()
{   let responses = [
      LlmResponse
      {   outcome: Outcome
          {   status: OutcomeStatus::Success
            , code: "OK".to_string()
            , violation_category: None
          }
        , data: Some(ResultData
          {   rewritten_text: Some("Testo \"citato\"\nsu due righe".to_string())
            , detected_language: Some("it".to_string())
          })
      }
    , LlmResponse
      {   outcome: Outcome
          {   status: OutcomeStatus::Refusal
            , code: "ETHIC_REFUSAL".to_string()
            , violation_category: Some("hate_speech".to_string())
          }
        , data: Some(ResultData
          {   rewritten_text: None
            , detected_language: Some("en".to_string())
          })
      }
    , LlmResponse::invalid_input("EMPTY_TEXT")
    ];
    for response in responses
    {   let raw = serde_json::to_string(&response).unwrap();
        let value = extract(&raw).unwrap();
        assert_eq!(value, serde_json::to_value(&response).unwrap());
        assert_eq!(LlmResponse::from_value(value).unwrap(), response);
    }
}

#[test]
fn contract_validation()
{   let missing_outcome = json!({"data": {"rewritten_text": "x"}});
    assert!(matches!(
      LlmResponse::from_value(missing_outcome),
      Err(Error::Validation(_))
    ));

    let success_without_text = json!({
      "outcome": {"status": "success", "code": "OK"},
      "data": {"rewritten_text": null}
    });
    assert!(matches!(
      LlmResponse::from_value(success_without_text),
      Err(Error::Validation(_))
    ));

    let success_without_data = json!({"outcome": {"status": "success", "code": "OK"}});
    assert!(LlmResponse::from_value(success_without_data).is_err());

    let unknown_status = json!({"outcome": {"status": "maybe", "code": "OK"}});
    assert!(matches!(
      LlmResponse::from_value(unknown_status),
      Err(Error::Validation(_))
    ));
}

#[test]
fn status_casing_is_tolerated_and_refusals_drop_text()
{   let shouting = json!({
      "outcome": {"status": "SUCCESS", "code": "OK"},
      "data": {"rewritten_text": "ok", "detected_language": "en"}
    });
    assert!(LlmResponse::from_value(shouting).unwrap().is_success());

    let refusal_with_text = json!({
      "outcome": {"status": "refusal", "code": "MANIPULATION_ATTEMPT",
                  "violation_category": "prompt_manipulation_attempt"},
      "data": {"rewritten_text": "leaked", "detected_language": "en"}
    });
    let response = LlmResponse::from_value(refusal_with_text).unwrap();
    assert_eq!(response.outcome.status, OutcomeStatus::Refusal);
    assert_eq!(response.rewritten_text(), None);
    assert_eq!(
      response.user_message(),
      "Request refused. Reason: MANIPULATION_ATTEMPT (prompt_manipulation_attempt)."
    );
}
