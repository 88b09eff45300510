//! 评分提示词构建
//!
//! 纯模板替换，输出包含严格 JSON 结构说明的提示词。

use crate::models::PaperContext;

/// 评分提示词构建器
pub struct PromptBuilder;

impl PromptBuilder {
    /// 构建评分提示词
    ///
    /// 缺失的上下文字段显示为 `N/A`。同样的输入总是得到同样的输出。
    pub fn build(
        context: &PaperContext,
        mark_scheme_text: &str,
        student_answer: &str,
        total_marks: i64,
    ) -> String {
        let subject_name = field(&context.subject_name, "the relevant subject");
        let subject_code = field(&context.subject_code, "N/A");
        let paper_number = field(&context.paper_number, "N/A");
        let variant = field(&context.variant, "N/A");
        let session_label = field(&context.session_label, "N/A");
        let year = field(&context.year, "N/A");

        format!(
            r#"You are an expert A-Level examiner for {subject_name} ({subject_code}), specifically marking Paper {paper_number} Variant {variant} from the {session_label} {year} series. The total marks for the question(s) answered by the student are {total_marks}.

You will be provided with the official Mark Scheme (if available and legible) and the student's answer. Your task is to:

1.  **Understand the Mark Scheme:** If a Mark Scheme is provided and contains meaningful content, carefully review it. Identify key assessment objectives, content points, levels of response, and specific mark allocations. If the Mark Scheme text says it was "not found", is "inaccessible", that its "extraction failed", that its "content sparse" or that the "paper id unrecognized", proceed by using your general A-Level marking expertise for this subject and paper type.
2.  **Evaluate the Student's Answer:** Assess the student's answer. If a valid Mark Scheme is present, evaluate strictly against it. Otherwise, use general A-Level criteria.
3.  **Provide Detailed Feedback (JSON Output):** Output ONLY a single, valid JSON object with the following keys:

    *   "score": (Integer, 0 to {total_marks}) The total mark awarded to the student out of {total_marks}.
    *   "totalMarks": (Integer) Reiterate {total_marks}.
    *   "grade": (String, one of "A", "B", "C", "D", "E", "U") Based on the percentage score/totalMarks: A >= 80%, B >= 70%, C >= 60%, D >= 50%, E >= 40%, otherwise U.
    *   "feedback": (String, 200-400 words) Constructive, detailed feedback for the student.
        *   Strengths: What the student did well, referencing their answer and Mark Scheme criteria (if available).
        *   Weaknesses/Improvements: Where the answer fell short, missed concepts, or lacked depth.
        *   Illustrative Quotes: Quote short, relevant phrases from the student's answer.
        *   Actionable Advice: Specific advice, ideally linked to Mark Scheme criteria.
        *   Tone: Supportive and encouraging.
    *   "highlightReferences": (Array of objects) Up to 5-7 key phrases from the *student's answer* that are significant. Format: [{{"studentPhrase": "...", "significance": "e.g., Correctly applied theory X.", "msMatchLevel": "e.g., Level 3 Descriptor (if Mark Scheme used)"}}]. Use an empty array [] if none stand out.
    *   "outline": (String, 3-7 bullet points) A concise model answer outline for achieving high marks, based on the Mark Scheme (if available) or general best practice for this question type.
    *   "sectionScores": (Object) If the question or Mark Scheme implies distinct sections (e.g., Section A, B or Part a, b), give a score breakdown. Format: {{"sectionA": {{"score": X, "max": Y}}}}. Each "score" and "max" is a non-negative integer and "score" never exceeds "max". Base "max" on typical A-Level structures for {subject_name} Paper {paper_number} if the Mark Scheme doesn't specify, or make a reasonable division of {total_marks}. Use an empty object {{}} if not applicable.

MARK SCHEME TEXT (may be a generic message if the file was not found or processed):
---
{mark_scheme_text}
---

STUDENT'S ANSWER TEXT:
---
{student_answer}
---

Remember to output ONLY the JSON object. Do not include any prefatory text or explanations outside the JSON structure. Ensure all string values within the JSON are properly escaped."#
        )
    }
}

fn field<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(default)
}
