use glam::Vec2;

use crate::config::{GameConfig, Level};
use crate::controller::input::InputSample;
use crate::controller::intent::{InputResolver, Intent};
use crate::controller::motion::{MotionBounds, MotionController, VelocityCommand};
use crate::controller::physics::{BodyId, KinematicWorld, Physics, Walls, WorldBounds, STEP_MS};
use crate::controller::scheduler::{ObstacleScheduler, SceneClock};
use crate::controller::spawner::ObstacleSpawner;
use crate::error::ConfigError;
use crate::model::assets::{Animation, Assets, PLAYER_SHAPE, PLAYER_SPRITE};

/// Longest stretch of physics simulated in one frame
pub const MAX_FRAME_MS: f64 = 100.0;

/// What happened during one [`GameScene::update`]
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub intent: Intent,
    pub command: VelocityCommand,
    pub spawned: Vec<BodyId>,
    /// Fixed physics steps run this frame
    pub substeps: usize,
}

/// All per-scene state: input latches, carried intent, spawn schedule,
/// the physics world and the player's body.
pub struct GameScene<P: Physics = KinematicWorld> {
    pub config: GameConfig,
    pub physics: P,
    pub player: BodyId,
    pub bounds: MotionBounds,
    pub intent: Intent,
    pub last_command: VelocityCommand,
    pub player_anim: Animation,
    resolver: InputResolver,
    motion: MotionController,
    scheduler: ObstacleScheduler,
    spawner: ObstacleSpawner,
    clock: SceneClock,
    step_accumulator_ms: f64,
}

impl GameScene<KinematicWorld> {
    pub fn create(assets: &Assets, level: &Level) -> Result<Self, ConfigError> {
        Self::create_with(KinematicWorld::new(), assets, level)
    }
}

impl<P: Physics> GameScene<P> {
    /// Validate the level, set up the world, add the player and arm every
    /// obstacle deadline at scene time zero.
    pub fn create_with(mut physics: P, assets: &Assets, level: &Level) -> Result<Self, ConfigError> {
        assets.validate(level)?;
        let config = level.config.clone();
        let width = config.canvas_width as f32;
        let height = config.canvas_height as f32;

        let gravity = if config.gravity_enabled { Vec2::new(0.0, 1.0) } else { Vec2::ZERO };
        physics.configure_world(
            WorldBounds::new(width, height, Walls { bottom: true, ..Default::default() }),
            gravity,
        );

        let player_shape = assets.fish_shapes.get(PLAYER_SHAPE)?;
        let player = physics.add_body(
            Vec2::new(config.player_x, height / 2.0),
            PLAYER_SPRITE,
            player_shape,
            config.player_scale,
        );
        let player_sprite = assets.sprites.get(PLAYER_SPRITE)?;
        let bounds = MotionBounds::new(player_sprite.height, config.player_scale, height);

        let clock = SceneClock::new();
        let mut scheduler = ObstacleScheduler::new();
        scheduler.arm(&level.obstacles, clock.now_ms());

        tracing::info!(
            obstacles = level.obstacles.len(),
            upper = bounds.upper,
            lower = bounds.lower,
            "scene created"
        );

        Ok(Self {
            resolver: InputResolver::new(config.dead_band, config.input_priority),
            motion: MotionController::new(config.player_speed),
            spawner: ObstacleSpawner::new(
                assets.obstacle_shapes.clone(),
                config.obstacle_velocity_x,
                config.obstacle_mass,
            ),
            config,
            physics,
            player,
            bounds,
            intent: Intent::Idle,
            last_command: VelocityCommand::Stop,
            player_anim: assets.player_anim.clone(),
            scheduler,
            clock,
            step_accumulator_ms: 0.0,
        })
    }

    /// Run one frame. `dt_ms` advances the scene clock as given. Motion runs
    /// in fixed `STEP_MS` substeps drawn from an accumulator, so the bound
    /// check sees every step however long the frame was; at most 100 ms of
    /// physics is simulated per frame so a stalled tab does not teleport
    /// bodies.
    pub fn update(&mut self, dt_ms: f64, sample: &InputSample) -> TickReport {
        self.clock.advance(dt_ms);

        let mut spawned = Vec::new();
        for descriptor in self.scheduler.due(self.clock.now_ms()) {
            match self.spawner.spawn(&mut self.physics, &descriptor) {
                Ok(id) => spawned.push(id),
                Err(e) => tracing::error!(error = %e, "obstacle spawn failed"),
            }
        }

        if dt_ms > 0.0 {
            self.step_accumulator_ms += dt_ms.min(MAX_FRAME_MS);
        }
        let step = STEP_MS as f64;
        let mut intent = self.intent;
        let mut substeps = 0;
        while self.step_accumulator_ms >= step {
            self.step_accumulator_ms -= step;
            intent = self.substep(sample);
            substeps += 1;
        }

        TickReport {
            intent,
            command: self.last_command,
            spawned,
            substeps,
        }
    }

    /// One fixed physics step: resolve, command the player, integrate.
    /// Returns the resolved intent.
    fn substep(&mut self, sample: &InputSample) -> Intent {
        self.physics.set_angle(self.player, 0.0);

        let resolved = self.resolver.resolve(sample, self.intent);
        if resolved != self.intent {
            tracing::debug!(from = ?self.intent, to = ?resolved, "intent changed");
        }

        let y = self.player_y();
        let (command, next) = self.motion.command(resolved, y, &self.bounds);
        match command {
            VelocityCommand::Vertical(vy) => self.physics.set_velocity_y(self.player, vy),
            VelocityCommand::Stop => self.physics.set_velocity(self.player, Vec2::ZERO),
        }
        self.intent = next;
        self.last_command = command;

        self.physics.step(STEP_MS);
        resolved
    }

    pub fn player_y(&self) -> f32 {
        self.physics
            .body(self.player)
            .map(|b| b.position.y)
            .unwrap_or(self.config.canvas_height as f32 / 2.0)
    }

    pub fn now_ms(&self) -> f64 {
        self.clock.now_ms()
    }

    pub fn obstacles_spawned(&self) -> usize {
        self.scheduler.fired()
    }

    pub fn obstacles_pending(&self) -> usize {
        self.scheduler.pending()
    }

    /// Scene time of the next obstacle, if any are still waiting
    pub fn next_spawn_ms(&self) -> Option<f64> {
        self.scheduler.next_deadline_ms()
    }

    pub fn resolver(&self) -> &InputResolver {
        &self.resolver
    }

    /// Current frame of the player's swim animation
    pub fn player_frame(&self) -> usize {
        self.player_anim.frame_at(self.clock.now_ms() as u64)
    }
}
