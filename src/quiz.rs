//! Quiz categories and in-memory quiz sessions.

use crate::models::QuizQuestion;
use std::io::{self, BufRead, Write};

/// Number of questions requested per quiz.
pub const QUIZ_LENGTH: usize = 5;

/// Drug classes offered as quiz categories.
pub const DRUG_CLASSES: &[&str] = &[
    "Statins",
    "Beta Blockers",
    "ACE Inhibitors",
    "Angiotensin II Receptor Blockers",
    "Calcium Channel Blockers",
    "Loop Diuretics",
    "Thiazide Diuretics",
    "Anticoagulants",
    "SSRIs",
    "Benzodiazepines",
    "Opioid Analgesics",
    "NSAIDs",
    "Proton Pump Inhibitors",
    "Penicillins",
    "Cephalosporins",
    "Fluoroquinolones",
    "Macrolides",
    "Sulfonylureas",
    "Corticosteroids",
    "Antihistamines",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStatus {
    InProgress,
    Finished,
}

/// Outcome of answering the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub correct_answer: String,
}

/// Tracks answers and score while a generated quiz is being taken.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    answers: Vec<Option<String>>,
    current: usize,
    score: usize,
    status: QuizStatus,
}

impl QuizSession {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let status = if questions.is_empty() {
            QuizStatus::Finished
        } else {
            QuizStatus::InProgress
        };

        Self {
            answers: vec![None; questions.len()],
            questions,
            current: 0,
            score: 0,
            status,
        }
    }

    pub fn status(&self) -> QuizStatus {
        self.status
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        match self.status {
            QuizStatus::InProgress => self.questions.get(self.current),
            QuizStatus::Finished => None,
        }
    }

    pub fn answer_for(&self, index: usize) -> Option<&str> {
        self.answers.get(index).and_then(|a| a.as_deref())
    }

    /// Record an answer for the current question.
    ///
    /// Only the first answer counts; returns `None` if the question was
    /// already answered or the quiz is finished.
    pub fn answer(&mut self, choice: &str) -> Option<AnswerOutcome> {
        let question = self.current_question()?;
        if self.answers[self.current].is_some() {
            return None;
        }

        let correct = question.is_correct(choice);
        let correct_answer = question.correct_answer.clone();

        self.answers[self.current] = Some(choice.to_string());
        if correct {
            self.score += 1;
        }

        Some(AnswerOutcome {
            correct,
            correct_answer,
        })
    }

    /// Move to the next question, finishing after the last one.
    pub fn advance(&mut self) -> QuizStatus {
        if self.status == QuizStatus::InProgress {
            if self.current + 1 < self.questions.len() {
                self.current += 1;
            } else {
                self.status = QuizStatus::Finished;
            }
        }
        self.status
    }
}

/// Parse `1-4` or `A-D` (any case) into an option index.
pub fn parse_choice(input: &str, option_count: usize) -> Option<usize> {
    let trimmed = input.trim();
    let mut chars = trimmed.chars();
    let c = chars.next()?;
    if chars.next().is_some() {
        return None;
    }

    let index = match c {
        '1'..='9' => c as usize - '1' as usize,
        'a'..='z' => c as usize - 'a' as usize,
        'A'..='Z' => c as usize - 'A' as usize,
        _ => return None,
    };

    (index < option_count).then_some(index)
}

/// Take a quiz on a line-oriented terminal. Returns the final score.
pub fn run_interactive<R: BufRead, W: Write>(
    session: &mut QuizSession,
    mut input: R,
    mut output: W,
) -> io::Result<usize> {
    while let Some(question) = session.current_question().cloned() {
        writeln!(
            output,
            "\nQuestion {} of {}: {}",
            session.current_index() + 1,
            session.total(),
            question.question
        )?;
        for (i, option) in question.options.iter().enumerate() {
            writeln!(output, "  {}) {}", (b'A' + i as u8) as char, option)?;
        }

        let choice = loop {
            write!(output, "Your answer: ")?;
            output.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                writeln!(output)?;
                return Ok(session.score());
            }
            match parse_choice(&line, question.options.len()) {
                Some(index) => break question.options[index].clone(),
                None => writeln!(
                    output,
                    "Please enter a letter A-{} or a number 1-{}.",
                    (b'A' + question.options.len().saturating_sub(1) as u8) as char,
                    question.options.len()
                )?,
            }
        };

        if let Some(outcome) = session.answer(&choice) {
            if outcome.correct {
                writeln!(output, "Correct!")?;
            } else {
                writeln!(output, "Incorrect. The answer is: {}", outcome.correct_answer)?;
            }
        }
        session.advance();
    }

    writeln!(
        output,
        "\nQuiz complete. You scored {} out of {}.",
        session.score(),
        session.total()
    )?;
    Ok(session.score())
}
