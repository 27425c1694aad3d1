use log::info;
pub type TaskID = i32;

pub trait SteppableTask: Send + 'static {
    /// Runs one tick. Returning `false` ends the task.
    fn step(&mut self) -> bool;

    /// Called once on the task's own thread after its last step, whether the
    /// task ended itself or was stopped.
    fn finish(&mut self) {}
}

/// Why [`ThreadManager::run_until_shutdown`] stopped the tasks.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ShutdownReason {
    Requested,
    TimeLimitReached,
}

pub struct ThreadManager {
    next_task_id: TaskID,
    tasks: std::collections::HashMap<TaskID, ManagedTask>,
}

impl ThreadManager {
    #[must_use]
    pub fn new() -> Self {
        ThreadManager {
            next_task_id: 0,
            tasks: std::collections::HashMap::new(),
        }
    }

    #[must_use]
    pub fn running_tasks(&self) -> usize {
        self.tasks.len()
    }

    /// Spawns `task` on its own named thread.
    ///
    /// A zero `period` steps the task back to back. Any other period steps it
    /// on a fixed schedule, waking early only for the stop signal.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the OS refuses to spawn the thread.
    pub fn add_task<T>(
        &mut self,
        name: &str,
        task: T,
        period: std::time::Duration,
    ) -> Result<TaskID, std::io::Error>
    where
        T: SteppableTask,
    {
        let id = self.next_task_id;

        let (stop_sender, stop_receiver) = crossbeam_channel::bounded::<()>(1);

        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut task = task;
                if period.is_zero() {
                    run_task_continuously(&mut task, &stop_receiver);
                } else {
                    run_task_with_period(&mut task, period, &stop_receiver);
                }
                task.finish();
            })?;
        info!("ThreadManager: Started task '{name}' with period {period:?}.");
        self.tasks.insert(
            id,
            ManagedTask {
                handle,
                stop_sender,
            },
        );
        self.next_task_id += 1;
        Ok(id)
    }

    pub fn stop_all_tasks(&self) {
        info!("ThreadManager: Signaling all tasks to stop...");
        for task in self.tasks.values() {
            let _ = task.stop_sender.try_send(());
        }
    }

    pub fn wait_on_task_finish(&mut self, task_id: TaskID) {
        if let Some(task) = self.tasks.remove(&task_id) {
            if task.handle.join().is_err() {
                log::error!("ThreadManager: Task {task_id} panicked.");
            }
        }
    }

    pub fn wait_on_all_tasks(&mut self) {
        let mut task_ids: Vec<TaskID> = self.tasks.keys().copied().collect();
        task_ids.sort_unstable();
        for task_id in task_ids {
            self.wait_on_task_finish(task_id);
        }
    }

    /// Blocks until a shutdown signal arrives on `shutdown` or `limit` elapses,
    /// then stops every task and joins them so their `finish` hooks run.
    ///
    /// A disconnected `shutdown` channel counts as a request.
    pub fn run_until_shutdown(
        &mut self,
        shutdown: &crossbeam_channel::Receiver<()>,
        limit: Option<std::time::Duration>,
    ) -> ShutdownReason {
        let reason = match limit {
            None => {
                let _ = shutdown.recv();
                ShutdownReason::Requested
            }
            Some(limit) => match shutdown.recv_timeout(limit) {
                Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    ShutdownReason::Requested
                }
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    ShutdownReason::TimeLimitReached
                }
            },
        };
        info!("ThreadManager: Shutting down ({reason:?}).");
        self.stop_all_tasks();
        self.wait_on_all_tasks();
        reason
    }
}

impl Default for ThreadManager {
    fn default() -> Self {
        ThreadManager::new()
    }
}

fn run_task_continuously<T: SteppableTask>(
    task: &mut T,
    stop_receiver: &crossbeam_channel::Receiver<()>,
) {
    loop {
        match stop_receiver.try_recv() {
            Ok(()) | Err(crossbeam_channel::TryRecvError::Disconnected) => break,
            Err(crossbeam_channel::TryRecvError::Empty) => {}
        }

        if !task.step() {
            break;
        }

        std::thread::yield_now();
    }
}

fn run_task_with_period<T: SteppableTask>(
    task: &mut T,
    period: std::time::Duration,
    stop_receiver: &crossbeam_channel::Receiver<()>,
) {
    let mut next_run = std::time::Instant::now();
    loop {
        if !task.step() {
            break;
        }

        next_run += period;
        let now = std::time::Instant::now();

        if next_run > now {
            let sleep_dur = next_run - now;
            // Wait for timeout (next loop) OR stop signal
            match stop_receiver.recv_timeout(sleep_dur) {
                Ok(()) | Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            }
        } else {
            // Overran the period: restart the schedule from now.
            log::debug!("Task overran its period by {:?}", now - next_run);
            next_run = now;

            if let Ok(()) = stop_receiver.try_recv() {
                break;
            }
        }
    }
}

struct ManagedTask {
    handle: std::thread::JoinHandle<()>,
    stop_sender: crossbeam_channel::Sender<()>,
}
