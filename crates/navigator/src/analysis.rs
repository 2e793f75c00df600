use indoc::formatdoc;

use crate::errors::{TurnError, TurnResult};

/// A resume to be compared against a job description
#[derive(Debug, Clone, PartialEq)]
pub struct ResumeAnalysis {
    resume: String,
    job_description: String,
}

impl ResumeAnalysis {
    /// Both texts are required; blank input is rejected before any request is made
    pub fn new<R: Into<String>, J: Into<String>>(resume: R, job_description: J) -> TurnResult<Self> {
        let resume = resume.into();
        let job_description = job_description.into();
        if resume.trim().is_empty() || job_description.trim().is_empty() {
            return Err(TurnError::validation(
                "Please provide both resume text and job description",
            ));
        }
        Ok(ResumeAnalysis {
            resume,
            job_description,
        })
    }

    /// The question sent to the chat API for this analysis
    pub fn question(&self) -> String {
        formatdoc! {"
            Analyze this resume against the job description:

            RESUME:
            {resume}

            JOB DESCRIPTION:
            {job_description}

            Please provide:
            1. Match percentage score
            2. Matching skills found
            3. Missing skills/requirements
            4. Experience gap analysis
            5. Recommended improvements
            6. Suggested interview preparation topics",
            resume = self.resume.trim(),
            job_description = self.job_description.trim(),
        }
    }
}
