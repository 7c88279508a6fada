#![no_main]
#![no_std]

mod clock;
mod config;
mod logger;

use gyrodrive::drivers::shared::{AtomicF32, HeadingChannel, TankCommand};
use gyrodrive::hardware::StopLatch;

static STOP_LATCH: StopLatch = StopLatch::new();
static LEFT_ANGLE: AtomicF32 = AtomicF32::zero();
static RIGHT_ANGLE: AtomicF32 = AtomicF32::zero();
static TANK: TankCommand = TankCommand::new();
static HEADING: HeadingChannel = HeadingChannel::new();

#[rtic::app(device = stm32f4xx_hal::pac, peripherals = true, dispatchers = [SPI2, SPI3])]
mod app {
    use crate::clock::MonoClock;
    use crate::config::{sys_config, tuning};
    use crate::logger;
    use crate::{HEADING, LEFT_ANGLE, RIGHT_ANGLE, STOP_LATCH, TANK};
    use cortex_m::asm;
    use gyrodrive::controller::wheels::{WheelSetPoints, WheelSpeedControl, WheelSpeeds};
    use gyrodrive::controller::{Drive, DriveConfig};
    use gyrodrive::drivers::encoder::n20;
    use gyrodrive::drivers::imu::{heading::GyroHeading, icm20948};
    use gyrodrive::drivers::motor::mdd3a;
    use gyrodrive::drivers::shared::{SharedEncoder, SharedHeading, SharedTank};
    use gyrodrive::hardware::{Clock, Hardware, HeadingSensor};
    use log::{error, info, warn};
    use panic_write::PanicHandler;
    use stm32f4xx_hal::{
        gpio::{Alternate, Edge, Input, Output, Pin, PushPull, PB3, PB4, PB5},
        pac::{SPI1, TIM1, TIM3, TIM4},
        prelude::*,
        qei::Qei,
        serial::{Config, Serial},
        spi::{Mode, Phase, Polarity, Spi},
        timer::pwm::PwmChannel,
    };
    use systick_monotonic::{fugit::Duration, Systick};

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        left_encoder: n20::N20<Qei<TIM3, (Pin<'A', 6, Alternate<2>>, Pin<'A', 7, Alternate<2>>)>>,
        right_encoder: n20::N20<Qei<TIM4, (Pin<'B', 6, Alternate<2>>, Pin<'B', 7, Alternate<2>>)>>,
        wheels: WheelSpeedControl<
            mdd3a::MDD3A<PwmChannel<TIM1, 0>, PwmChannel<TIM1, 1>>,
            mdd3a::MDD3A<PwmChannel<TIM1, 2>, PwmChannel<TIM1, 3>>,
        >,
        wheel_prev_ticks: u64,
        imu: icm20948::ICM20948<
            Spi<SPI1, (PB3<Alternate<5>>, PB4<Alternate<5>>, PB5<Alternate<5>>)>,
            Pin<'A', 4, Output<PushPull>>,
        >,
        gyro: GyroHeading<{ sys_config::IMU_SMA_FILTER_SIZE }>,
        imu_prev_ticks: u64,
        stop_button: Pin<'C', 13, Input>,
        start_button: Pin<'B', 0, Input>,
    }

    #[monotonic(binds = SysTick, default = true)]
    type MonoTimer = Systick<1000>;

    #[init]
    fn init(ctx: init::Context) -> (Shared, Local, init::Monotonics) {
        let mut dp = ctx.device;

        // configure clocks
        let rcc = dp.RCC.constrain();
        let mono = Systick::new(ctx.core.SYST, sys_config::SYSCLK_HZ);
        let clocks = rcc.cfgr.sysclk(sys_config::SYSCLK_HZ.Hz()).freeze();

        let gpioa = dp.GPIOA.split();
        let gpiob = dp.GPIOB.split();
        let gpioc = dp.GPIOC.split();

        // set up uart tx, shared by the logger and the panic handler
        let tx_pin = gpioa.pa2.into_alternate();
        let serial = Serial::tx(
            dp.USART2,
            tx_pin,
            Config::default()
                .baudrate(sys_config::SERIAL_BAUD.bps())
                .wordlength_8()
                .parity_none(),
            &clocks,
        )
        .unwrap();
        if logger::init(PanicHandler::new(serial), sys_config::LOG_LEVEL).is_err() {
            panic!("logger installed twice");
        }

        // set up encoders
        let left_qei = Qei::new(
            dp.TIM3,
            (gpioa.pa6.into_alternate(), gpioa.pa7.into_alternate()),
        );
        let right_qei = Qei::new(
            dp.TIM4,
            (gpiob.pb6.into_alternate(), gpiob.pb7.into_alternate()),
        );
        let left_encoder = n20::N20::new(left_qei, sys_config::ENCODER_COUNTS_PER_REV);
        let right_encoder = n20::N20::new(right_qei, sys_config::ENCODER_COUNTS_PER_REV);

        // set up PWM
        let channels = (
            gpioa.pa8.into_alternate(),
            gpioa.pa9.into_alternate(),
            gpioa.pa10.into_alternate(),
            gpioa.pa11.into_alternate(),
        );
        let pwms = dp
            .TIM1
            .pwm_hz(channels, sys_config::PWM_FREQ_KHZ.kHz(), &clocks)
            .split();
        let left_motor = mdd3a::MDD3A::new((pwms.0, pwms.1));
        let right_motor = mdd3a::MDD3A::new((pwms.2, pwms.3));
        let wheels = WheelSpeedControl::new(
            left_motor,
            right_motor,
            tuning::WHEEL_TUNING,
            sys_config::WHEEL_DIRECTIONS,
            sys_config::MAX_WHEEL_SPEED_DPS,
        );

        // configure IMU spi and cs
        let imu_cs = gpioa.pa4.into_push_pull_output();
        let imu_sclk = gpiob.pb3.into_alternate();
        let imu_mosi = gpiob.pb5.into_alternate();
        let imu_miso = gpiob.pb4.into_alternate();
        let imu_spi = Spi::new(
            dp.SPI1,
            (imu_sclk, imu_miso, imu_mosi),
            Mode {
                polarity: Polarity::IdleLow,
                phase: Phase::CaptureOnFirstTransition,
            },
            1.MHz(),
            &clocks,
        );

        // set up IMU sensor; a missing gyro is fatal
        let mut delay = dp.TIM5.delay_ms(&clocks);
        let mut imu = icm20948::ICM20948::new(imu_spi, imu_cs);
        match imu.init(
            icm20948::GyroFullScaleSel::Dps500,
            icm20948::GyroDLPFSel::D51bw2N73bw3,
            &mut delay,
        ) {
            Ok(_) => info!("imu initialized"),
            Err(e) => {
                match e {
                    icm20948::ErrorCode::ParamError => error!("param error"),
                    icm20948::ErrorCode::SpiError => error!("SPI error"),
                    icm20948::ErrorCode::WrongID => error!("wrong ID"),
                    icm20948::ErrorCode::CSError => error!("CS error"),
                }
                panic!("imu initialization failed");
            }
        }
        let gyro = GyroHeading::new(sys_config::IMU_RATE_DEADBAND_DPS);

        // stop button interrupts on both edges, start button is polled
        let mut syscfg = dp.SYSCFG.constrain();
        let mut stop_button = gpioc.pc13.into_pull_up_input();
        stop_button.make_interrupt_source(&mut syscfg);
        stop_button.trigger_on_edge(&mut dp.EXTI, Edge::RisingFalling);
        stop_button.enable_interrupt(&mut dp.EXTI);
        let start_button = gpiob.pb0.into_pull_up_input();

        info!("system initialized");

        let now = monotonics::now().ticks();
        wheel_control::spawn().unwrap();
        imu_sample::spawn().unwrap();

        (
            Shared {},
            Local {
                left_encoder,
                right_encoder,
                wheels,
                wheel_prev_ticks: now,
                imu,
                gyro,
                imu_prev_ticks: now,
                stop_button,
                start_button,
            },
            init::Monotonics(mono),
        )
    }

    #[task(priority = 3, local = [left_encoder, right_encoder, wheels, wheel_prev_ticks])]
    fn wheel_control(cx: wheel_control::Context) {
        let now = monotonics::now().ticks();
        let deltat = (now - *cx.local.wheel_prev_ticks) as f32 * sys_config::SECONDS_PER_TICK;
        *cx.local.wheel_prev_ticks = now;

        let dirs = sys_config::WHEEL_DIRECTIONS;
        let vels = WheelSpeeds {
            left: dirs.left * cx.local.left_encoder.get_speed(deltat),
            right: dirs.right * cx.local.right_encoder.get_speed(deltat),
        };
        LEFT_ANGLE.store(dirs.left * cx.local.left_encoder.get_angle());
        RIGHT_ANGLE.store(dirs.right * cx.local.right_encoder.get_angle());

        if STOP_LATCH.is_tripped() || TANK.is_holding() {
            cx.local.wheels.brake();
        } else {
            let (left, right) = TANK.powers();
            cx.local
                .wheels
                .set_power_targets(&WheelSetPoints { left, right });
        }
        cx.local.wheels.step(&vels);

        // run at 1 kHz
        wheel_control::spawn_after(Duration::<u64, 1, 1000>::millis(
            sys_config::WHEEL_CONTROL_PERIOD_MS,
        ))
        .unwrap();
    }

    #[task(priority = 2, local = [imu, gyro, imu_prev_ticks])]
    fn imu_sample(cx: imu_sample::Context) {
        let now = monotonics::now().ticks();
        let deltat = (now - *cx.local.imu_prev_ticks) as f32 * sys_config::SECONDS_PER_TICK;
        *cx.local.imu_prev_ticks = now;

        // a failed read skips the sample and keeps the last heading
        if let Ok(rate) = cx.local.imu.read_gyro_z() {
            let was_ready = cx.local.gyro.is_ready();
            cx.local.gyro.update(rate, deltat);
            HEADING.publish(cx.local.gyro.heading());
            if !was_ready && cx.local.gyro.is_ready() {
                info!(
                    "gyro bias {} dps, drift {} deg",
                    cx.local.gyro.bias(),
                    cx.local.gyro.drift()
                );
                HEADING.publish_ready(cx.local.gyro.drift());
            }
        }

        // run at 100 Hz
        imu_sample::spawn_after(Duration::<u64, 1, 1000>::millis(sys_config::IMU_PERIOD_MS))
            .unwrap();
    }

    #[task(binds = EXTI15_10, priority = 4, local = [stop_button])]
    fn stop_button(cx: stop_button::Context) {
        let button = cx.local.stop_button;
        button.clear_interrupt_pending_bit();
        if button.is_low() {
            STOP_LATCH.trip();
        } else {
            STOP_LATCH.release();
        }
    }

    #[idle(local = [start_button])]
    fn idle(cx: idle::Context) -> ! {
        let mut clock = MonoClock;
        let mut gyro = SharedHeading::new(&HEADING);

        // the robot must stand still while the gyro calibrates
        let deadline = clock.millis() + sys_config::IMU_READY_TIMEOUT_MS;
        while !gyro.is_ready() && clock.millis() < deadline {
            asm::nop();
        }

        let hw = Hardware {
            left: SharedEncoder::new(&LEFT_ANGLE),
            right: SharedEncoder::new(&RIGHT_ANGLE),
            motors: SharedTank::new(&TANK),
            gyro,
            clock,
        };
        let config = DriveConfig::new(sys_config::WHEEL_DIAMETER_CM, sys_config::WHEEL_BASE_CM)
            .with_forward(sys_config::MOTORS_FORWARD)
            .with_gyro_direction(sys_config::GYRO_DIRECTION)
            .with_min_speed(tuning::MIN_SPEED)
            .with_max_steering(tuning::MAX_STEERING);

        let mut drive = match Drive::setup(hw, config, &STOP_LATCH) {
            Ok(drive) => drive,
            Err(e) => {
                error!("{}", e);
                panic!("drive setup failed: {}", e);
            }
        };
        info!("press start to run the route\n{}", drive.info());

        loop {
            if cx.local.start_button.is_high() {
                continue;
            }
            drive.hardware_mut().clock.pause(sys_config::BUTTON_DEBOUNCE_MS);
            while cx.local.start_button.is_low() {
                asm::nop();
            }
            if drive.is_stopped() {
                warn!("release the stop button first");
                continue;
            }

            drive.hardware_mut().clock.pause(sys_config::ROUTE_START_DELAY_MS);
            let outcome = drive.drive_route(&tuning::ROUTE);
            info!("route {:?}\n{}", outcome, drive.info());
        }
    }
}
