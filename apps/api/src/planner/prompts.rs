// Prompt constants for the study planner.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Study schedule prompt template.
/// Replace: {json_only_instruction}, then {request_json} last so that user
/// data is never scanned for placeholders.
pub const STUDY_PLAN_PROMPT_TEMPLATE: &str = r#"You are an expert in time management and study planning. You rank and weight many student signals at once to build personalized schedules.

Analyze the following student data and create a personalized independent study schedule. The schedule must help the student manage study time for all of their courses.

OBJECTIVE:
Produce a study schedule that is load-balanced across the week, weighted toward the student's preferences, and free of conflicts with existing commitments.

USER DATA (JSON):
{request_json}

TASK:
Create a personalized independent study schedule that:

1. Allocates study time per course, weighing:
   - SKS definition (minutes of study per credit unit; "sks_definition" × course "sks" is the base duration)
   - Course difficulty (1-5, harder courses get more time)
   - Practical requirements ("has_practical" courses need hands-on sessions)
   - Course relationships ("related_courses" should be studied close together)
   - Evaluation methods ("evaluation_methods" shape the kind of activity)
   - Reading load (1-5, heavier reading needs longer sessions)
   - User preferences/interests ("preference" 1-5)

2. Respects the existing class schedule ("existing_schedule"): no session may overlap it

3. Aligns with the student's:
   - Preferred study times
   - Sleep schedule (no sessions between sleep_time and wake_time)
   - Number of study days per week (5 or 7 days)
   - Maximum consecutive study hours

4. Suggests specific study activities aligned with the student's learning style

5. Distributes the study load evenly throughout the week

6. Optimizes retention by scheduling review sessions at appropriate intervals

IMPORTANT: Your response must ONLY be a JSON array of study sessions with this exact structure:
[
  {
    "tanggal": "YYYY-MM-DD",
    "waktu_mulai": "HH:MM",
    "waktu_berakhir": "HH:MM",
    "mata_kuliah": "Course Name",
    "aktivitas": "Specific Study Activity Description"
  }
]

Every object MUST contain all five keys exactly as spelled above: "tanggal" is the date, "waktu_mulai" the start time, "waktu_berakhir" the end time, "mata_kuliah" the course name, "aktivitas" the study activity.

{json_only_instruction}"#;
