use rand::RngExt;
use serde::Deserialize;

use parsons_core::protocol::{LlmBlock, LlmPuzzle};

use crate::state::LlmConfig;

const SYSTEM_PROMPT: &str = r#"You are a programming puzzle generator. Given a programming task, create a solution and then break it down into individual code blocks that can be rearranged to form the complete solution. For each code block, provide an explanation of what it does and why it's important.

Format your response as a JSON object with the following structure:
{
  "blocks": [
    {
      "code": "Line or block of code",
      "explanation": "Explanation of what this line of code does, its purpose, and why it is needed",
      "indentation": 0
    },
    ...more blocks
  ]
}

"indentation" is the number of indentation levels for the line. Make sure each block is a meaningful unit of code (e.g., a line, a function, a loop body). Include all necessary code to solve the problem."#;

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Ask the upstream model for a puzzle for `task`.
pub async fn request_puzzle(
    http: &reqwest::Client,
    config: &LlmConfig,
    api_key: &str,
    task: &str,
) -> Result<LlmPuzzle, Box<dyn std::error::Error + Send + Sync>> {
    let body = serde_json::json!({
        "model": config.model,
        "messages": [
            { "role": "system", "content": SYSTEM_PROMPT },
            {
                "role": "user",
                "content": format!("Generate a programming puzzle for this task: {}", task),
            },
        ],
        "temperature": 0.7,
        "max_tokens": 2000,
        "response_format": { "type": "json_object" },
    });

    let resp = http
        .post(format!("{}/chat/completions", config.base_url))
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?
        .error_for_status()?;

    let completion: ChatCompletion = resp.json().await?;
    let content = completion
        .choices
        .first()
        .and_then(|choice| choice.message.content.as_deref())
        .ok_or("completion had no content")?;

    let puzzle: LlmPuzzle = serde_json::from_str(content)?;
    if puzzle.blocks.is_empty() {
        return Err("model returned no blocks".into());
    }
    Ok(puzzle)
}

/// Built-in puzzles served when no upstream key is available.
pub fn sample_puzzle<R: RngExt>(rng: &mut R) -> LlmPuzzle {
    let samples: [&[(&str, &str, u32)]; 2] = [
        &[
            ("def countdown(n):", "Defines the function and its argument.", 0),
            ("    while n > 0:", "Loops until the counter reaches zero.", 1),
            ("        print(n)", "Shows the current value each pass.", 2),
            ("        n -= 1", "Moves the counter toward the exit condition.", 2),
            ("    print(\"Liftoff!\")", "Runs once after the loop finishes.", 1),
        ],
        &[
            ("def safe_div(a, b):", "Defines the function and its arguments.", 0),
            ("    try:", "Opens the guarded section.", 1),
            ("        return a / b", "The division that may fail.", 2),
            ("    except ZeroDivisionError:", "Catches division by zero.", 1),
            ("        return None", "Signals the failure to the caller.", 2),
        ],
    ];

    let chosen = samples[rng.random_range(0..samples.len())];
    LlmPuzzle {
        blocks: chosen
            .iter()
            .map(|(code, explanation, indentation)| LlmBlock {
                code: (*code).to_string(),
                explanation: (*explanation).to_string(),
                indentation: *indentation,
            })
            .collect(),
    }
}
