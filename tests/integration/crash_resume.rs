//! A worker that keeps crashing still finishes its job, one restart at a time

use relaunch::checkpoint::resume_point;
use relaunch::supervisor::ProgressTailer;
use relaunch::worker::{CheckpointWriter, JobFile, SimulatedWorker, WorkerRuntime};

use super::helpers::*;

/// One worker process lifetime: open the log, load the job, run until done or crashed.
fn run_once(job_dir: &JobDir) -> anyhow::Result<u32> {
    let job = JobFile::load(&job_dir.job_path)?;
    let writer = CheckpointWriter::open(&job.log_path)?;
    let mut runtime = WorkerRuntime::new(SimulatedWorker::new(job));
    runtime.set_load_handler(Box::new(writer));
    runtime.load_job();
    let outcome = runtime.run_pending();
    let completed = runtime.host().completed();
    outcome.map(|_| completed)
}

#[test]
fn test_crashing_worker_resumes_from_last_checkpoint() {
    let job_dir = JobDir::new("end = 5\nunit_millis = 0\nfail_after = 2\n");

    // 1,2 | 2,3 | 3,4 | 4,5 then done
    for _ in 0..3 {
        assert!(run_once(&job_dir).is_err());
    }
    assert_eq!(run_once(&job_dir).unwrap(), 2);

    assert_eq!(checkpoint_ids(&job_dir.log_path), vec![1, 2, 2, 3, 3, 4, 4, 5]);
    assert_eq!(resume_point(&job_dir.log_path), 5);

    let content = job_dir.log_content();
    assert_eq!(content.matches("Logging initialized.").count(), 4);
    assert!(content.contains("Resuming from frame: 1"));
    assert!(content.contains("Resuming from frame: 4"));
}

#[test]
fn test_tailer_reports_each_unit_once_across_crashes() {
    let job_dir = JobDir::new("end = 6\nunit_millis = 0\nfail_after = 3\n");
    let observer = CollectingObserver::new();
    let mut tailer = ProgressTailer::new(job_dir.log_path.clone(), observer.clone());

    assert_eq!(tailer.tick(), 0);

    // Run 1 writes 1,2,3; run 2 resumes at 3 and writes 3,4,5; run 3 writes 5,6.
    assert!(run_once(&job_dir).is_err());
    assert_eq!(tailer.tick(), 3);
    assert!(run_once(&job_dir).is_err());
    assert_eq!(tailer.tick(), 2);
    assert_eq!(run_once(&job_dir).unwrap(), 2);
    assert_eq!(tailer.tick(), 1);
    assert_eq!(tailer.tick(), 0);

    assert_eq!(observer.progress(), vec![1, 2, 3, 4, 5, 6]);
    assert!(observer
        .messages()
        .iter()
        .all(|m| m.starts_with("Rendered Frame: ")));
}

#[test]
fn test_finished_job_does_no_more_work() {
    let job_dir = JobDir::new("start = 3\nend = 4\nunit_millis = 0\n");

    assert_eq!(run_once(&job_dir).unwrap(), 2);
    // The last unit is redone on every load, matching a restart after a crash on it.
    assert_eq!(run_once(&job_dir).unwrap(), 1);

    assert_eq!(checkpoint_ids(&job_dir.log_path), vec![3, 4, 4]);
    let observer = CollectingObserver::new();
    let mut tailer = ProgressTailer::new(job_dir.log_path.clone(), observer.clone());
    tailer.tick();
    assert_eq!(observer.progress(), vec![3, 4]);
}
