//! Generation prompt and response schema

use super::config::{QuestionType, QuizConfig};
use crate::llm::StructuredRequest;
use serde_json::{json, Value};

/// Sampling temperature for quiz generation
pub const QUIZ_TEMPERATURE: f32 = 0.7;

/// Build the one-shot request for a quiz
pub fn quiz_request(config: &QuizConfig) -> StructuredRequest {
    StructuredRequest::new(build_prompt(config), quiz_schema(config.question_type))
        .with_temperature(QUIZ_TEMPERATURE)
}

fn type_directive(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::MultipleChoice => "Trắc nghiệm (4 lựa chọn)",
        QuestionType::TrueFalse => "Đúng/Sai (2 lựa chọn theo đúng thứ tự: Đúng, Sai)",
    }
}

pub fn build_prompt(config: &QuizConfig) -> String {
    let topic = config.topic.trim();
    let topic_line = if topic.is_empty() {
        "- Chủ đề: chọn ngẫu nhiên các vấn đề an toàn mạng phổ biến.".to_string()
    } else {
        format!("- Chủ đề: \"{topic}\".")
    };

    format!(
        "Hãy tạo một bộ câu hỏi kiểm tra kiến thức về an toàn số.
{topic_line}
- Số lượng câu: {count}.
- Loại câu hỏi: {directive}.
- Chỉ số đáp án đúng (correctAnswerIndex) bắt đầu từ 0.
- Ngôn ngữ: Tiếng Việt.
- Yêu cầu: Câu hỏi phải thực tế, mang tính giáo dục cao.",
        count = config.count,
        directive = type_directive(config.question_type),
    )
}

/// JSON schema for an array of questions, pinning the option count
pub fn quiz_schema(question_type: QuestionType) -> Value {
    let options = question_type.option_count();
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "question": { "type": "STRING", "description": "Nội dung câu hỏi" },
                "options": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "minItems": options,
                    "maxItems": options,
                    "description": "Danh sách các lựa chọn trả lời"
                },
                "correctAnswerIndex": {
                    "type": "INTEGER",
                    "description": "Chỉ số của câu trả lời đúng (bắt đầu từ 0)"
                },
                "explanation": {
                    "type": "STRING",
                    "description": "Giải thích ngắn gọn tại sao đáp án đó đúng"
                }
            },
            "required": ["question", "options", "correctAnswerIndex", "explanation"]
        }
    })
}
