/*
 * @Author       : 老董
 * @Date         : 2026-02-05
 * @Description  : 模糊化层（第 1 层）：输入 → 各模糊集的隶属度
 */

use crate::config::{MembershipFamily, ParameterSpec};
use crate::nn::context::zip_for_each;
use crate::nn::params::MembershipParams;
use crate::nn::ComputeContext;
use enum_dispatch::enum_dispatch;
use ndarray::{Array2, Array3, Array4, ArrayView2, ArrayView3, Axis, Zip};

/// 单个隶属度函数的计算约定
///
/// 参数统一为 (center, width, slope)，高斯型忽略 slope。
#[enum_dispatch]
pub trait MembershipFunction {
    /// 隶属度，取值范围 [0, 1]
    fn degree(&self, x: f64, center: f64, width: f64, slope: f64) -> f64;

    /// 隶属度对 (center, width, slope) 的偏导数
    fn gradient(&self, x: f64, center: f64, width: f64, slope: f64) -> [f64; 3];

    /// 是否带有可学习的斜率参数
    fn has_slope(&self) -> bool;

    fn family(&self) -> MembershipFamily;
}

/// 高斯型：μ = exp(-(x-c)² / (2σ²))
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GaussianMf;

impl MembershipFunction for GaussianMf {
    #[inline]
    fn degree(&self, x: f64, center: f64, width: f64, _slope: f64) -> f64 {
        let d = x - center;
        (-(d * d) / (2.0 * width * width)).exp()
    }

    /// - ∂μ/∂c = μ·(x-c)/σ²
    /// - ∂μ/∂σ = μ·(x-c)²/σ³
    #[inline]
    fn gradient(&self, x: f64, center: f64, width: f64, slope: f64) -> [f64; 3] {
        let mu = self.degree(x, center, width, slope);
        let d = x - center;
        let w2 = width * width;
        [mu * d / w2, mu * d * d / (w2 * width), 0.0]
    }

    fn has_slope(&self) -> bool {
        false
    }

    fn family(&self) -> MembershipFamily {
        MembershipFamily::Gaussian
    }
}

/// 广义钟型：μ = 1 / (1 + |(x-c)/a|^(2b))
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BellMf;

impl MembershipFunction for BellMf {
    #[inline]
    fn degree(&self, x: f64, center: f64, width: f64, slope: f64) -> f64 {
        let z2 = ((x - center) / width).powi(2);
        1.0 / (1.0 + z2.powf(slope))
    }

    /// 记 t = |z|^(2b)，μ(1-μ) = t/(1+t)²：
    /// - ∂μ/∂c = 2b·μ(1-μ)/(x-c)
    /// - ∂μ/∂a = 2b·μ(1-μ)/a
    /// - ∂μ/∂b = -μ(1-μ)·ln(z²)
    ///
    /// x == c 处各偏导均取 0。
    #[inline]
    fn gradient(&self, x: f64, center: f64, width: f64, slope: f64) -> [f64; 3] {
        let d = x - center;
        if d == 0.0 {
            return [0.0, 0.0, 0.0];
        }
        let mu = self.degree(x, center, width, slope);
        let s = mu * (1.0 - mu);
        let z2 = (d / width).powi(2);
        [2.0 * slope * s / d, 2.0 * slope * s / width, -s * z2.ln()]
    }

    fn has_slope(&self) -> bool {
        true
    }

    fn family(&self) -> MembershipFamily {
        MembershipFamily::Bell
    }
}

/// 构建时选定的隶属度函数族，之后不再切换
#[enum_dispatch(MembershipFunction)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipKernel {
    Gaussian(GaussianMf),
    Bell(BellMf),
}

impl From<MembershipFamily> for MembershipKernel {
    fn from(family: MembershipFamily) -> Self {
        match family {
            MembershipFamily::Gaussian => GaussianMf.into(),
            MembershipFamily::Bell => BellMf.into(),
        }
    }
}

/// 模糊化层
///
/// # 输入/输出形状
/// - 输入：[batch_size, n_input]
/// - 输出：[batch_size, n_input, n_memb]
#[derive(Debug, Clone)]
pub struct MembershipLayer {
    kernel: MembershipKernel,
    n_input: usize,
    n_memb: usize,
}

/// 钟型斜率的初始值
const INITIAL_SLOPE: f64 = 2.0;

impl MembershipLayer {
    pub fn new(family: MembershipFamily, n_input: usize, n_memb: usize) -> Self {
        Self {
            kernel: family.into(),
            n_input,
            n_memb,
        }
    }

    pub const fn kernel(&self) -> MembershipKernel {
        self.kernel
    }

    pub const fn n_input(&self) -> usize {
        self.n_input
    }

    pub const fn n_memb(&self) -> usize {
        self.n_memb
    }

    /// 可学习参数个数
    pub fn param_count(&self) -> usize {
        let per_set = if self.kernel.has_slope() { 3 } else { 2 };
        self.n_input * self.n_memb * per_set
    }

    /// 初始化参数
    ///
    /// 中心在 `input_range` 上均匀铺开（只有一个模糊集时取中点），
    /// 宽度取相邻中心的间距，斜率取 2。
    pub fn init_params(&self, spec: &ParameterSpec) -> MembershipParams {
        let (low, high) = spec.input_range();
        let m = self.n_memb;
        let (centers_1d, width) = if m == 1 {
            (vec![(low + high) / 2.0], high - low)
        } else {
            let step = (high - low) / (m - 1) as f64;
            ((0..m).map(|j| low + step * j as f64).collect(), step)
        };
        let width = width.max(spec.min_width());

        let centers = Array2::from_shape_fn((self.n_input, m), |(_, j)| centers_1d[j]);
        let widths = Array2::from_elem((self.n_input, m), width);
        let slopes = self
            .kernel
            .has_slope()
            .then(|| Array2::from_elem((self.n_input, m), INITIAL_SLOPE));

        MembershipParams {
            centers,
            widths,
            slopes,
        }
    }

    /// 前向传播：计算每个样本在每个 (维度, 模糊集) 上的隶属度
    pub fn forward(
        &self,
        ctx: ComputeContext,
        params: &MembershipParams,
        x: ArrayView2<'_, f64>,
    ) -> Array3<f64> {
        let kernel = self.kernel;
        let mut degrees = Array3::zeros((x.nrows(), self.n_input, self.n_memb));
        zip_for_each!(
            ctx,
            Zip::from(degrees.outer_iter_mut()).and(x.rows()),
            |mut block, row| {
                Zip::indexed(&mut block).for_each(|(d, j), mu| {
                    *mu = kernel.degree(
                        row[d],
                        params.centers[[d, j]],
                        params.widths[[d, j]],
                        params.slope(d, j),
                    );
                });
            }
        );
        degrees
    }

    /// 反向传播：由 ∂L/∂μ [batch, n_input, n_memb] 得到各参数的梯度
    ///
    /// 返回 (∂L/∂centers, ∂L/∂widths, ∂L/∂slopes)，
    /// 高斯型的斜率梯度为 None。
    pub fn backward(
        &self,
        ctx: ComputeContext,
        params: &MembershipParams,
        x: ArrayView2<'_, f64>,
        upstream: ArrayView3<'_, f64>,
    ) -> (Array2<f64>, Array2<f64>, Option<Array2<f64>>) {
        let kernel = self.kernel;
        // 每个样本各自的贡献：[batch, 3, n_input, n_memb]
        let mut contributions = Array4::zeros((x.nrows(), 3, self.n_input, self.n_memb));
        zip_for_each!(
            ctx,
            Zip::from(contributions.outer_iter_mut())
                .and(x.rows())
                .and(upstream.outer_iter()),
            |mut block, row, grad| {
                for ((d, j), &g) in grad.indexed_iter() {
                    if g == 0.0 {
                        continue;
                    }
                    let partials = kernel.gradient(
                        row[d],
                        params.centers[[d, j]],
                        params.widths[[d, j]],
                        params.slope(d, j),
                    );
                    for (k, p) in partials.iter().enumerate() {
                        block[[k, d, j]] = g * p;
                    }
                }
            }
        );

        let summed = contributions.sum_axis(Axis(0));
        let centers = summed.index_axis(Axis(0), 0).to_owned();
        let widths = summed.index_axis(Axis(0), 1).to_owned();
        let slopes = kernel
            .has_slope()
            .then(|| summed.index_axis(Axis(0), 2).to_owned());
        (centers, widths, slopes)
    }
}
