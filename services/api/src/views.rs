//! HTML Views
//!
//! Server-rendered markup for the two quiz pages. Texts are Korean, matching
//! the audience of the generated questions.

use finquiz_core::session::{AnswerView, QuizView};
use maud::{DOCTYPE, Markup, html};

pub const QUIZ_TITLE: &str = "생성형 AI가 만든 금융경제 퀴즈!";
pub const ANSWER_TITLE: &str = "정답 및 설명";
const CHOOSE_LABEL: &str = "정답을 선택하세요:";
const SUBMIT_LABEL: &str = "정답 제출";
const NEXT_LABEL: &str = "다음 문제";
const RETRY_LABEL: &str = "다시 시도";
const RESET_LABEL: &str = "처음부터";

fn layout(heading: Option<&str>, body: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="ko" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (heading.unwrap_or(QUIZ_TITLE)) }
            }
            body {
                main {
                    @if let Some(heading) = heading {
                        h1 { (heading) }
                    }
                    (body)
                }
            }
        }
    }
}

/// The quiz page. `notice` is shown above the question, e.g. after an
/// invalid submission.
pub fn quiz_page(view: &QuizView, notice: Option<&str>) -> Markup {
    layout(
        Some(QUIZ_TITLE),
        html! {
            @if let Some(notice) = notice {
                p class="notice" role="alert" { (notice) }
            }
            p class="question" { (view.question) }
            form method="post" action="/submit" {
                fieldset {
                    legend { (CHOOSE_LABEL) }
                    @for (index, (key, text)) in view.options.iter().enumerate() {
                        @let checked = match &view.selected {
                            Some(selected) => selected == key,
                            None => index == 0,
                        };
                        label {
                            input type="radio" name="answer" value=(key) checked[checked];
                            " " (text)
                        }
                        br;
                    }
                }
                button type="submit" { (SUBMIT_LABEL) }
            }
        },
    )
}

/// The answer page, showing the stored answer key and explanation verbatim.
pub fn answer_page(view: &AnswerView) -> Markup {
    layout(
        Some(ANSWER_TITLE),
        html! {
            p class="answer" { "정답: " (view.correct_answer) }
            p { "관련 설명:" }
            p class="explanation" { (view.explanation) }
            form method="post" action="/next" {
                button type="submit" { (NEXT_LABEL) }
            }
        },
    )
}

/// Shown when no question could be produced.
pub fn unavailable_page(message: &str) -> Markup {
    layout(
        Some(QUIZ_TITLE),
        html! {
            p class="notice" role="alert" { (message) }
            form method="post" action="/next" {
                button type="submit" { (RETRY_LABEL) }
            }
            form method="post" action="/reset" {
                button type="submit" { (RESET_LABEL) }
            }
        },
    )
}

/// A page with nothing on it, used when the router has nothing to display.
pub fn blank_page() -> Markup {
    layout(None, html! {})
}
