//! Generate a Gantt chart payload for manual inspection

fn main() {
    let json = r#"{
        "report_metadata": { "student_id": "demo-student", "report_generation_time": "2024-05-20 10:15:00" },
        "detailed_sequence_analysis": [
            {
                "batch_index": 1,
                "image_filenames_in_batch": ["10-00-00-000.jpg", "10-00-04-500.jpg", "10-00-09-000.jpg"],
                "analysis": {
                    "per_image_highlights": [
                        { "image_index_in_sequence": 0, "behavior_category": "筆記", "confidence": 0.92 },
                        { "image_index_in_sequence": 1, "behavior_category": "目視黑板/老師", "confidence": 0.81 },
                        { "image_index_in_sequence": 2, "behavior_category": "玩弄物品", "confidence": 0.66 }
                    ]
                }
            },
            {
                "batch_index": 2,
                "image_filenames_in_batch": ["10-00-13-000.jpg"],
                "analysis": { "error": "model timeout" }
            }
        ]
    }"#;

    let processor = classroom_lens::ReportProcessor::new();
    match processor.process_pretty(json) {
        Ok(chart) => println!("{chart}"),
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
